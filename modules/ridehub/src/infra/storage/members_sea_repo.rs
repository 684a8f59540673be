use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::ChapterMember;
use crate::domain::permissions::Role;
use crate::domain::repos::MembersRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::chapter_member::{
    ActiveModel as MemberAM, Column, Entity as MemberEntity,
};
use crate::infra::storage::mapper::try_collect;

fn role_rank(role: Role) -> u8 {
    match role {
        Role::Owner => 0,
        Role::Admin => 1,
        Role::Member => 2,
    }
}

#[async_trait]
impl MembersRepository for SeaRepository {
    async fn find_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ChapterMember>, DomainError> {
        MemberEntity::find()
            .filter(Column::ChapterId.eq(chapter_id))
            .filter(Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(ChapterMember::try_from)
            .transpose()
    }

    async fn list_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<ChapterMember>, DomainError> {
        let rows = MemberEntity::find()
            .filter(Column::ChapterId.eq(chapter_id))
            .order_by_asc(Column::JoinedAt)
            .order_by_asc(Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut members: Vec<ChapterMember> = try_collect(rows)?;
        // Stable sort keeps join order inside each role.
        members.sort_by_key(|m| role_rank(m.role));
        Ok(members)
    }

    async fn count_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        role: Option<Role>,
    ) -> Result<u64, DomainError> {
        let mut select = MemberEntity::find().filter(Column::ChapterId.eq(chapter_id));
        if let Some(role) = role {
            select = select.filter(Column::Role.eq(role.as_str()));
        }
        select.count(conn).await.map_err(db_err)
    }

    async fn insert_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        member: ChapterMember,
    ) -> Result<ChapterMember, DomainError> {
        let m = MemberAM {
            id: Set(member.id),
            chapter_id: Set(member.chapter_id),
            user_id: Set(member.user_id),
            role: Set(member.role.as_str().to_owned()),
            joined_at: Set(member.joined_at),
        };
        let _ = m.insert(conn).await.map_err(db_err)?;
        Ok(member)
    }

    async fn update_member_role<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<ChapterMember, DomainError> {
        let existing = MemberEntity::find()
            .filter(Column::ChapterId.eq(chapter_id))
            .filter(Column::UserId.eq(user_id))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Member", user_id))?;

        let mut am = existing.into_active_model();
        am.role = Set(role.as_str().to_owned());
        am.update(conn).await.map_err(db_err)?.try_into()
    }

    async fn delete_member<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = MemberEntity::delete_many()
            .filter(Column::ChapterId.eq(chapter_id))
            .filter(Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_chapter_members<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<u64, DomainError> {
        let res = MemberEntity::delete_many()
            .filter(Column::ChapterId.eq(chapter_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }
}
