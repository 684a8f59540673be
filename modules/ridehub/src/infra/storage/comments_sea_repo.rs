use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::Comment;
use crate::domain::repos::CommentsRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::comment::{
    ActiveModel as CommentAM, Column, Entity as CommentEntity,
};

fn active_model(c: &Comment) -> CommentAM {
    CommentAM {
        id: Set(c.id),
        ride_id: Set(c.ride_id),
        author_id: Set(c.author_id),
        body: Set(c.body.clone()),
        created_at: Set(c.created_at),
        updated_at: Set(c.updated_at),
    }
}

#[async_trait]
impl CommentsRepository for SeaRepository {
    async fn find_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Comment>, DomainError> {
        let found = CommentEntity::find_by_id(id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn list_comments<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<Vec<Comment>, DomainError> {
        let rows = CommentEntity::find()
            .filter(Column::RideId.eq(ride_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        comment: Comment,
    ) -> Result<Comment, DomainError> {
        let _ = active_model(&comment).insert(conn).await.map_err(db_err)?;
        Ok(comment)
    }

    async fn update_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        comment: Comment,
    ) -> Result<Comment, DomainError> {
        let updated = active_model(&comment)
            .update(conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => DomainError::not_found("Comment", comment.id),
                other => db_err(other),
            })?;
        Ok(updated.into())
    }

    async fn delete_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = CommentEntity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
