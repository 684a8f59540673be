use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::Comment;

#[async_trait]
pub trait CommentsRepository: Send + Sync {
    async fn find_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Comment>, DomainError>;

    /// Oldest first.
    async fn list_comments<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<Vec<Comment>, DomainError>;

    async fn insert_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        comment: Comment,
    ) -> Result<Comment, DomainError>;

    async fn update_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        comment: Comment,
    ) -> Result<Comment, DomainError>;

    async fn delete_comment<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;
}
