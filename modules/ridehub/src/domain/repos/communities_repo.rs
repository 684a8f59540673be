use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Community, CommunityFilter, Page};

#[async_trait]
pub trait CommunitiesRepository: Send + Sync {
    async fn find_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Community>, DomainError>;

    async fn find_community_by_slug<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        slug: &str,
    ) -> Result<Option<Community>, DomainError>;

    /// Ordered by name.
    async fn list_communities<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &CommunityFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<Community>, DomainError>;

    async fn insert_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community: Community,
    ) -> Result<Community, DomainError>;

    async fn update_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community: Community,
    ) -> Result<Community, DomainError>;

    /// Deletes the community row only; children are removed by the service.
    async fn delete_community<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;
}
