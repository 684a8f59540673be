use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use super::access::{delete_chapter_cascade, effective_role, load_chapter, require_chapter_admin};
use super::{now, optional_text, patch_optional, required_text, slugify};
use crate::domain::error::DomainError;
use crate::domain::models::{
    Chapter, ChapterDetails, ChapterMember, ChapterPatch, NewChapter,
};
use crate::domain::permissions::{Role, can_assign, is_admin, is_owner, normalize_role};
use crate::domain::repos::Repositories;

const MAX_NAME_LENGTH: usize = 120;
const MAX_CITY_LENGTH: usize = 120;
const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Chapters and their memberships.
///
/// Every chapter keeps at least one `OWNER`: removing, demoting or the
/// self-leave of the last owner is rejected as a validation error.
pub struct ChaptersService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
}

impl<R: Repositories> ChaptersService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection) -> Self {
        Self { repo, db }
    }

    pub async fn list_chapters(&self, community_id: Uuid) -> Result<Vec<Chapter>, DomainError> {
        if self
            .repo
            .find_community(&self.db, community_id)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found("Community", community_id));
        }
        self.repo.list_chapters(&self.db, community_id).await
    }

    pub async fn get_chapter(&self, id: Uuid) -> Result<ChapterDetails, DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, id).await?;
        let member_count = self.repo.count_members(&self.db, id, None).await?;
        Ok(ChapterDetails {
            chapter,
            member_count,
        })
    }

    /// Only the community owner may open a chapter; they become its first owner.
    #[tracing::instrument(skip(self, new), fields(user.id = %caller))]
    pub async fn create_chapter(
        &self,
        caller: Uuid,
        community_id: Uuid,
        new: NewChapter,
    ) -> Result<Chapter, DomainError> {
        let community = self
            .repo
            .find_community(&self.db, community_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Community", community_id))?;
        if community.owner_id != caller {
            return Err(DomainError::forbidden(
                "only the community owner may create chapters",
            ));
        }

        let name = required_text("name", &new.name, MAX_NAME_LENGTH)?;
        let city = required_text("city", &new.city, MAX_CITY_LENGTH)?;
        let slug = slugify(new.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(DomainError::validation(
                "slug",
                "must contain at least one letter or digit",
            ));
        }
        if self
            .repo
            .find_chapter_by_slug(&self.db, community_id, &slug)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "chapter slug '{slug}' is already taken in this community"
            )));
        }

        let ts = now();
        let chapter = Chapter {
            id: Uuid::now_v7(),
            community_id,
            slug,
            name,
            city,
            description: optional_text("description", new.description, MAX_DESCRIPTION_LENGTH)?,
            strava_club_id: None,
            strava_linked_by: None,
            created_at: ts,
            updated_at: ts,
        };

        let txn = self.db.begin().await?;
        let chapter = self.repo.insert_chapter(&txn, chapter).await?;
        self.repo
            .insert_member(
                &txn,
                ChapterMember {
                    id: Uuid::now_v7(),
                    chapter_id: chapter.id,
                    user_id: caller,
                    role: Role::Owner,
                    joined_at: ts,
                },
            )
            .await?;
        txn.commit().await?;

        tracing::info!(chapter.id = %chapter.id, "Created chapter");
        Ok(chapter)
    }

    #[tracing::instrument(skip(self, patch), fields(user.id = %caller))]
    pub async fn update_chapter(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: ChapterPatch,
    ) -> Result<Chapter, DomainError> {
        let mut chapter = load_chapter(self.repo.as_ref(), &self.db, id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;

        if let Some(name) = patch.name.as_deref() {
            chapter.name = required_text("name", name, MAX_NAME_LENGTH)?;
        }
        if let Some(city) = patch.city.as_deref() {
            chapter.city = required_text("city", city, MAX_CITY_LENGTH)?;
        }
        patch_optional(
            &mut chapter.description,
            "description",
            patch.description,
            MAX_DESCRIPTION_LENGTH,
        )?;
        chapter.updated_at = now();

        self.repo.update_chapter(&self.db, chapter).await
    }

    /// Chapter owner (or community owner) only. Removes everything under the chapter.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn delete_chapter(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, id).await?;
        let role = effective_role(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        if !is_owner(role) {
            return Err(DomainError::forbidden("only a chapter owner may delete it"));
        }

        let txn = self.db.begin().await?;
        delete_chapter_cascade(self.repo.as_ref(), &txn, id).await?;
        txn.commit().await?;
        tracing::info!("Deleted chapter");
        Ok(())
    }

    // ==================== Membership ====================

    pub async fn list_members(&self, chapter_id: Uuid) -> Result<Vec<ChapterMember>, DomainError> {
        load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        self.repo.list_members(&self.db, chapter_id).await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn join(&self, caller: Uuid, chapter_id: Uuid) -> Result<ChapterMember, DomainError> {
        load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        if self
            .repo
            .find_member(&self.db, chapter_id, caller)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("already a member of this chapter"));
        }
        self.repo
            .insert_member(
                &self.db,
                ChapterMember {
                    id: Uuid::now_v7(),
                    chapter_id,
                    user_id: caller,
                    role: Role::Member,
                    joined_at: now(),
                },
            )
            .await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn leave(&self, caller: Uuid, chapter_id: Uuid) -> Result<(), DomainError> {
        load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;

        let txn = self.db.begin().await?;
        let member = self
            .repo
            .find_member(&txn, chapter_id, caller)
            .await?
            .ok_or_else(|| DomainError::not_found("Member", caller))?;
        self.ensure_not_last_owner(&txn, &member).await?;
        self.repo.delete_member(&txn, chapter_id, caller).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Admin adds someone with an explicit role.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn add_member(
        &self,
        caller: Uuid,
        chapter_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> Result<ChapterMember, DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        let actor = require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        let role = parse_role(role)?;
        if !can_assign(Some(actor), role) {
            return Err(DomainError::forbidden("only owners may grant the OWNER role"));
        }
        if self.repo.find_user(&self.db, user_id).await?.is_none() {
            return Err(DomainError::not_found("User", user_id));
        }
        if self
            .repo
            .find_member(&self.db, chapter_id, user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("user is already a member of this chapter"));
        }

        self.repo
            .insert_member(
                &self.db,
                ChapterMember {
                    id: Uuid::now_v7(),
                    chapter_id,
                    user_id,
                    role,
                    joined_at: now(),
                },
            )
            .await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn change_role(
        &self,
        caller: Uuid,
        chapter_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> Result<ChapterMember, DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        let actor = require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        let role = parse_role(role)?;

        let txn = self.db.begin().await?;
        let member = self
            .repo
            .find_member(&txn, chapter_id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Member", user_id))?;
        if !can_assign(Some(actor), role) || !can_assign(Some(actor), member.role) {
            return Err(DomainError::forbidden("only owners may grant or revoke the OWNER role"));
        }
        if member.role == role {
            return Ok(member);
        }
        if role != Role::Owner {
            self.ensure_not_last_owner(&txn, &member).await?;
        }
        let updated = self
            .repo
            .update_member_role(&txn, chapter_id, user_id, role)
            .await?;
        txn.commit().await?;

        tracing::info!(member.id = %user_id, role = %role, "Changed member role");
        Ok(updated)
    }

    /// Admins remove others; anyone may remove themselves.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn remove_member(
        &self,
        caller: Uuid,
        chapter_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DomainError> {
        if caller == user_id {
            return self.leave(caller, chapter_id).await;
        }

        let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        let actor = effective_role(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        if !is_admin(actor) {
            return Err(DomainError::forbidden("chapter admin role required"));
        }

        let txn = self.db.begin().await?;
        let member = self
            .repo
            .find_member(&txn, chapter_id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Member", user_id))?;
        if !can_assign(actor, member.role) {
            return Err(DomainError::forbidden("only owners may remove an owner"));
        }
        self.ensure_not_last_owner(&txn, &member).await?;
        self.repo.delete_member(&txn, chapter_id, user_id).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn ensure_not_last_owner<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        member: &ChapterMember,
    ) -> Result<(), DomainError> {
        if member.role != Role::Owner {
            return Ok(());
        }
        let owners = self
            .repo
            .count_members(conn, member.chapter_id, Some(Role::Owner))
            .await?;
        if owners <= 1 {
            return Err(DomainError::validation(
                "role",
                "a chapter must keep at least one owner",
            ));
        }
        Ok(())
    }
}

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    normalize_role(raw)
        .ok_or_else(|| DomainError::validation("role", format!("unknown role '{}'", raw.trim())))
}
