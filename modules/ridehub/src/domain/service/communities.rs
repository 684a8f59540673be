use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use super::access::delete_chapter_cascade;
use super::{ServiceConfig, now, optional_text, patch_optional, required_text, slugify};
use crate::domain::error::DomainError;
use crate::domain::models::{
    Community, CommunityFilter, CommunityPatch, NewCommunity, Page, PageRequest,
};
use crate::domain::repos::Repositories;

const MAX_NAME_LENGTH: usize = 120;
const MAX_SLUG_LENGTH: usize = 80;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_URL_LENGTH: usize = 2048;

/// Brands, clubs and teams. The creator owns the community.
pub struct CommunitiesService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
    config: ServiceConfig,
}

impl<R: Repositories> CommunitiesService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection, config: ServiceConfig) -> Self {
        Self { repo, db, config }
    }

    pub async fn list_communities(
        &self,
        filter: &CommunityFilter,
        page: PageRequest,
    ) -> Result<Page<Community>, DomainError> {
        let (limit, offset) = self.config.limit_cfg().resolve(page);
        self.repo
            .list_communities(&self.db, filter, limit, offset)
            .await
    }

    pub async fn get_community(&self, id: Uuid) -> Result<Community, DomainError> {
        self.repo
            .find_community(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Community", id))
    }

    #[tracing::instrument(skip(self, new), fields(user.id = %caller))]
    pub async fn create_community(
        &self,
        caller: Uuid,
        new: NewCommunity,
    ) -> Result<Community, DomainError> {
        let name = required_text("name", &new.name, MAX_NAME_LENGTH)?;
        let slug = slugify(new.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(DomainError::validation(
                "slug",
                "must contain at least one letter or digit",
            ));
        }
        if slug.len() > MAX_SLUG_LENGTH {
            return Err(DomainError::validation(
                "slug",
                format!("must be at most {MAX_SLUG_LENGTH} characters"),
            ));
        }
        if self
            .repo
            .find_community_by_slug(&self.db, &slug)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "community slug '{slug}' is already taken"
            )));
        }

        let ts = now();
        let community = Community {
            id: Uuid::now_v7(),
            slug,
            name,
            kind: new.kind,
            description: optional_text("description", new.description, MAX_DESCRIPTION_LENGTH)?,
            website: optional_text("website", new.website, MAX_URL_LENGTH)?,
            logo_url: optional_text("logo_url", new.logo_url, MAX_URL_LENGTH)?,
            owner_id: caller,
            created_at: ts,
            updated_at: ts,
        };

        tracing::info!(slug = %community.slug, "Creating community");
        self.repo.insert_community(&self.db, community).await
    }

    #[tracing::instrument(skip(self, patch), fields(user.id = %caller))]
    pub async fn update_community(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: CommunityPatch,
    ) -> Result<Community, DomainError> {
        let mut community = self.owned_community(caller, id).await?;

        if let Some(name) = patch.name.as_deref() {
            community.name = required_text("name", name, MAX_NAME_LENGTH)?;
        }
        if let Some(kind) = patch.kind {
            community.kind = kind;
        }
        patch_optional(
            &mut community.description,
            "description",
            patch.description,
            MAX_DESCRIPTION_LENGTH,
        )?;
        patch_optional(&mut community.website, "website", patch.website, MAX_URL_LENGTH)?;
        patch_optional(&mut community.logo_url, "logo_url", patch.logo_url, MAX_URL_LENGTH)?;
        community.updated_at = now();

        self.repo.update_community(&self.db, community).await
    }

    /// Delete the community and every chapter under it in one transaction.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn delete_community(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        let community = self.owned_community(caller, id).await?;

        let txn = self.db.begin().await?;
        let chapters = self.repo.list_chapters(&txn, community.id).await?;
        for chapter in &chapters {
            delete_chapter_cascade(self.repo.as_ref(), &txn, chapter.id).await?;
        }
        self.repo.delete_community(&txn, community.id).await?;
        txn.commit().await?;

        tracing::info!(chapters = chapters.len(), "Deleted community");
        Ok(())
    }

    async fn owned_community(&self, caller: Uuid, id: Uuid) -> Result<Community, DomainError> {
        let community = self.get_community(id).await?;
        if community.owner_id != caller {
            return Err(DomainError::forbidden("only the community owner may do this"));
        }
        Ok(community)
    }
}
