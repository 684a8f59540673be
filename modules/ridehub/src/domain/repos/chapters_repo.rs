use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::Chapter;

#[async_trait]
pub trait ChaptersRepository: Send + Sync {
    async fn find_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Chapter>, DomainError>;

    async fn find_chapter_by_slug<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community_id: Uuid,
        slug: &str,
    ) -> Result<Option<Chapter>, DomainError>;

    /// Chapters of one community ordered by name.
    async fn list_chapters<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        community_id: Uuid,
    ) -> Result<Vec<Chapter>, DomainError>;

    /// Chapters with a Strava club linked, for the periodic sync.
    async fn list_strava_linked_chapters<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<Chapter>, DomainError>;

    async fn find_chapter_by_strava_club<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        club_id: i64,
    ) -> Result<Option<Chapter>, DomainError>;

    async fn insert_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter: Chapter,
    ) -> Result<Chapter, DomainError>;

    async fn update_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter: Chapter,
    ) -> Result<Chapter, DomainError>;

    async fn delete_chapter<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;
}
