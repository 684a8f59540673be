use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Page, User};

/// Repository trait for user profile persistence.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<User>, DomainError>;

    /// Exact, case-insensitive email match.
    async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Page of users whose display name or email contains `query`, ordered by display name.
    async fn search_users<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        query: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<User>, DomainError>;

    async fn insert_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError>;

    async fn update_user<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError>;
}
