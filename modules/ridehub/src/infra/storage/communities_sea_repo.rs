use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{like_pattern, SeaRepository};
use crate::domain::error::DomainError;
use crate::domain::models::{Community, CommunityFilter, Page};
use crate::domain::repos::CommunitiesRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::community::{
    ActiveModel as CommunityAM, Column, Entity as CommunityEntity,
};
use crate::infra::storage::mapper::try_collect;

fn active_model(c: &Community) -> CommunityAM {
    CommunityAM {
        id: Set(c.id),
        slug: Set(c.slug.clone()),
        name: Set(c.name.clone()),
        kind: Set(c.kind.as_str().to_owned()),
        description: Set(c.description.clone()),
        website: Set(c.website.clone()),
        logo_url: Set(c.logo_url.clone()),
        owner_id: Set(c.owner_id),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

#[async_trait]
impl CommunitiesRepository for SeaRepository {
    async fn find_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Community>, DomainError> {
        CommunityEntity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?
            .map(Community::try_from)
            .transpose()
    }

    async fn find_community_by_slug<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        slug: &str,
    ) -> Result<Option<Community>, DomainError> {
        CommunityEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(Community::try_from)
            .transpose()
    }

    async fn list_communities<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &CommunityFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<Community>, DomainError> {
        let mut select = CommunityEntity::find();
        if let Some(kind) = filter.kind {
            select = select.filter(Column::Kind.eq(kind.as_str()));
        }
        if let Some(q) = filter.search.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = like_pattern(q);
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                    .add(Column::Slug.like(pattern)),
            );
        }

        let total = select.clone().count(conn).await.map_err(db_err)?;
        let models = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(conn)
            .await
            .map_err(db_err)?;

        Ok(Page {
            items: try_collect(models)?,
            limit,
            offset,
            total,
        })
    }

    async fn insert_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community: Community,
    ) -> Result<Community, DomainError> {
        let _ = active_model(&community).insert(conn).await.map_err(db_err)?;
        Ok(community)
    }

    async fn update_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community: Community,
    ) -> Result<Community, DomainError> {
        let id = community.id;
        active_model(&community)
            .update(conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Community", id),
                other => db_err(other),
            })?
            .try_into()
    }

    async fn delete_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = CommunityEntity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
