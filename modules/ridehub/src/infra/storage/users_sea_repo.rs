use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{like_pattern, SeaRepository};
use crate::domain::error::DomainError;
use crate::domain::models::{Page, User};
use crate::domain::repos::UsersRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::user::{ActiveModel as UserAM, Column, Entity as UserEntity};

fn active_model(user: &User) -> UserAM {
    UserAM {
        id: Set(user.id),
        email: Set(user.email.clone()),
        display_name: Set(user.display_name.clone()),
        bio: Set(user.bio.clone()),
        avatar_url: Set(user.avatar_url.clone()),
        location: Set(user.location.clone()),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

#[async_trait]
impl UsersRepository for SeaRepository {
    async fn find_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<User>, DomainError> {
        let found = UserEntity::find_by_id(id).one(conn).await.map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<User>, DomainError> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn search_users<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        query: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<User>, DomainError> {
        let mut select = UserEntity::find();
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = like_pattern(q);
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(Column::DisplayName))).like(pattern.clone()))
                    .add(Column::Email.like(pattern)),
            );
        }

        let total = select.clone().count(conn).await.map_err(db_err)?;
        let items = select
            .order_by_asc(Column::DisplayName)
            .order_by_asc(Column::Id)
            .limit(limit)
            .offset(offset)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(Page {
            items,
            limit,
            offset,
            total,
        })
    }

    async fn insert_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError> {
        let _ = active_model(&user).insert(conn).await.map_err(db_err)?;
        Ok(user)
    }

    async fn update_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError> {
        let updated = active_model(&user).update(conn).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DomainError::not_found("User", user.id),
            other => db_err(other),
        })?;
        Ok(updated.into())
    }
}
