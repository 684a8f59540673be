use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::ChapterMember;
use crate::domain::permissions::Role;

#[async_trait]
pub trait MembersRepository: Send + Sync {
    async fn find_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ChapterMember>, DomainError>;

    /// Owners first, then admins, then members; each group by join time.
    async fn list_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<ChapterMember>, DomainError>;

    async fn count_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        role: Option<Role>,
    ) -> Result<u64, DomainError>;

    async fn insert_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        member: ChapterMember,
    ) -> Result<ChapterMember, DomainError>;

    async fn update_member_role<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<ChapterMember, DomainError>;

    async fn delete_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DomainError>;

    async fn delete_chapter_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<u64, DomainError>;
}
