use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::Sponsor;

#[async_trait]
pub trait SponsorsRepository: Send + Sync {
    async fn find_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Sponsor>, DomainError>;

    /// Ordered by position, then name.
    async fn list_sponsors<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<Sponsor>, DomainError>;

    async fn max_sponsor_position<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Option<i32>, DomainError>;

    async fn insert_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        sponsor: Sponsor,
    ) -> Result<Sponsor, DomainError>;

    async fn update_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        sponsor: Sponsor,
    ) -> Result<Sponsor, DomainError>;

    async fn delete_sponsor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    async fn delete_chapter_sponsors<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<u64, DomainError>;
}
