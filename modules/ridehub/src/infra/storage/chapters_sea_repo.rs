use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::Chapter;
use crate::domain::repos::ChaptersRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::chapter::{
    ActiveModel as ChapterAM, Column, Entity as ChapterEntity,
};

fn active_model(c: &Chapter) -> ChapterAM {
    ChapterAM {
        id: Set(c.id),
        community_id: Set(c.community_id),
        slug: Set(c.slug.clone()),
        name: Set(c.name.clone()),
        city: Set(c.city.clone()),
        description: Set(c.description.clone()),
        strava_club_id: Set(c.strava_club_id),
        strava_linked_by: Set(c.strava_linked_by),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

#[async_trait]
impl ChaptersRepository for SeaRepository {
    async fn find_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Chapter>, DomainError> {
        let found = ChapterEntity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_chapter_by_slug<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community_id: Uuid,
        slug: &str,
    ) -> Result<Option<Chapter>, DomainError> {
        let found = ChapterEntity::find()
            .filter(Column::CommunityId.eq(community_id))
            .filter(Column::Slug.eq(slug))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list_chapters<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community_id: Uuid,
    ) -> Result<Vec<Chapter>, DomainError> {
        let rows = ChapterEntity::find()
            .filter(Column::CommunityId.eq(community_id))
            .order_by_asc(Column::Name)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_strava_linked_chapters<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<Chapter>, DomainError> {
        let rows = ChapterEntity::find()
            .filter(Column::StravaClubId.is_not_null())
            .order_by_asc(Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_chapter_by_strava_club<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        club_id: i64,
    ) -> Result<Option<Chapter>, DomainError> {
        let found = ChapterEntity::find()
            .filter(Column::StravaClubId.eq(club_id))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn insert_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter: Chapter,
    ) -> Result<Chapter, DomainError> {
        let _ = active_model(&chapter).insert(conn).await.map_err(db_err)?;
        Ok(chapter)
    }

    async fn update_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter: Chapter,
    ) -> Result<Chapter, DomainError> {
        let updated = active_model(&chapter)
            .update(conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Chapter", chapter.id),
                other => db_err(other),
            })?;
        Ok(updated.into())
    }

    async fn delete_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = ChapterEntity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
