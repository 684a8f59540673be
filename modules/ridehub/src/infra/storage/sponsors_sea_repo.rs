use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::Sponsor;
use crate::domain::repos::SponsorsRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::sponsor::{
    ActiveModel as SponsorAM, Column, Entity as SponsorEntity,
};

fn active_model(s: &Sponsor) -> SponsorAM {
    SponsorAM {
        id: Set(s.id),
        chapter_id: Set(s.chapter_id),
        name: Set(s.name.clone()),
        website: Set(s.website.clone()),
        logo_url: Set(s.logo_url.clone()),
        tier: Set(s.tier.clone()),
        position: Set(s.position),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

#[async_trait]
impl SponsorsRepository for SeaRepository {
    async fn find_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Sponsor>, DomainError> {
        let found = SponsorEntity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list_sponsors<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<Sponsor>, DomainError> {
        let rows = SponsorEntity::find()
            .filter(Column::ChapterId.eq(chapter_id))
            .order_by_asc(Column::Position)
            .order_by_asc(Column::Name)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn max_sponsor_position<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Option<i32>, DomainError> {
        let max: Option<Option<i32>> = SponsorEntity::find()
            .select_only()
            .column_as(Column::Position.max(), "max_position")
            .filter(Column::ChapterId.eq(chapter_id))
            .into_tuple()
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(max.flatten())
    }

    async fn insert_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        sponsor: Sponsor,
    ) -> Result<Sponsor, DomainError> {
        let _ = active_model(&sponsor).insert(conn).await.map_err(db_err)?;
        Ok(sponsor)
    }

    async fn update_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        sponsor: Sponsor,
    ) -> Result<Sponsor, DomainError> {
        let updated = active_model(&sponsor)
            .update(conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Sponsor", sponsor.id),
                other => db_err(other),
            })?;
        Ok(updated.into())
    }

    async fn delete_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = SponsorEntity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_chapter_sponsors<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<u64, DomainError> {
        let res = SponsorEntity::delete_many()
            .filter(Column::ChapterId.eq(chapter_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }
}
