use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::access::{load_chapter, require_chapter_admin};
use super::{now, optional_text, patch_optional, required_text};
use crate::domain::error::DomainError;
use crate::domain::models::{NewSponsor, Sponsor, SponsorPatch};
use crate::domain::repos::Repositories;

const MAX_NAME_LENGTH: usize = 120;
const MAX_TIER_LENGTH: usize = 64;
const MAX_URL_LENGTH: usize = 2048;

/// Sponsor placements shown on a chapter page. Writes need chapter admin.
pub struct SponsorsService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
}

impl<R: Repositories> SponsorsService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection) -> Self {
        Self { repo, db }
    }

    pub async fn list_sponsors(&self, chapter_id: Uuid) -> Result<Vec<Sponsor>, DomainError> {
        load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        self.repo.list_sponsors(&self.db, chapter_id).await
    }

    /// Without an explicit position the sponsor is appended at the end.
    #[tracing::instrument(skip(self, new), fields(user.id = %caller))]
    pub async fn add_sponsor(
        &self,
        caller: Uuid,
        chapter_id: Uuid,
        new: NewSponsor,
    ) -> Result<Sponsor, DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;

        let position = match new.position {
            Some(p) => validate_position(p)?,
            None => self
                .repo
                .max_sponsor_position(&self.db, chapter_id)
                .await?
                .map_or(0, |max| max.saturating_add(1)),
        };

        let ts = now();
        self.repo
            .insert_sponsor(
                &self.db,
                Sponsor {
                    id: Uuid::now_v7(),
                    chapter_id,
                    name: required_text("name", &new.name, MAX_NAME_LENGTH)?,
                    website: optional_text("website", new.website, MAX_URL_LENGTH)?,
                    logo_url: optional_text("logo_url", new.logo_url, MAX_URL_LENGTH)?,
                    tier: optional_text("tier", new.tier, MAX_TIER_LENGTH)?,
                    position,
                    created_at: ts,
                    updated_at: ts,
                },
            )
            .await
    }

    #[tracing::instrument(skip(self, patch), fields(user.id = %caller))]
    pub async fn update_sponsor(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: SponsorPatch,
    ) -> Result<Sponsor, DomainError> {
        let mut sponsor = self.managed_sponsor(caller, id).await?;
        if let Some(name) = patch.name.as_deref() {
            sponsor.name = required_text("name", name, MAX_NAME_LENGTH)?;
        }
        patch_optional(&mut sponsor.website, "website", patch.website, MAX_URL_LENGTH)?;
        patch_optional(&mut sponsor.logo_url, "logo_url", patch.logo_url, MAX_URL_LENGTH)?;
        patch_optional(&mut sponsor.tier, "tier", patch.tier, MAX_TIER_LENGTH)?;
        if let Some(position) = patch.position {
            sponsor.position = validate_position(position)?;
        }
        sponsor.updated_at = now();
        self.repo.update_sponsor(&self.db, sponsor).await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn delete_sponsor(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        self.managed_sponsor(caller, id).await?;
        self.repo.delete_sponsor(&self.db, id).await?;
        Ok(())
    }

    async fn managed_sponsor(&self, caller: Uuid, id: Uuid) -> Result<Sponsor, DomainError> {
        let sponsor = self
            .repo
            .find_sponsor(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Sponsor", id))?;
        let chapter = load_chapter(self.repo.as_ref(), &self.db, sponsor.chapter_id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        Ok(sponsor)
    }
}

fn validate_position(position: i32) -> Result<i32, DomainError> {
    if position < 0 {
        return Err(DomainError::validation("position", "must not be negative"));
    }
    Ok(position)
}
