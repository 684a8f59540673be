//! Domain service layer: business rules over the repositories.
//!
//! One submodule per resource. Services receive the caller's user id from
//! the REST layer and enforce chapter roles before touching storage.
//! Multi-row changes run inside a single `DatabaseTransaction`.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use time::OffsetDateTime;

use crate::config::{RideHubConfig, SecretString};
use crate::domain::error::DomainError;
use crate::domain::models::LimitCfg;
use crate::domain::ports::{BrandLookup, ImageUploader, StravaApi};
use crate::domain::repos::Repositories;

mod access;
mod assets;
mod chapters;
mod comments;
mod communities;
mod rides;
mod sponsors;
mod strava;
mod users;

pub use assets::AssetsService;
pub use chapters::ChaptersService;
pub use comments::CommentsService;
pub use communities::CommunitiesService;
pub use rides::RidesService;
pub use sponsors::SponsorsService;
pub use strava::{StravaService, sign_state, verify_state};
pub use users::UsersService;

/// Limits applied by the services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_display_name_length: usize,
    pub max_comment_length: usize,
    pub max_recurrence_occurrences: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&RideHubConfig::default())
    }
}

impl From<&RideHubConfig> for ServiceConfig {
    fn from(cfg: &RideHubConfig) -> Self {
        Self {
            max_display_name_length: cfg.max_display_name_length,
            max_comment_length: cfg.max_comment_length,
            max_recurrence_occurrences: cfg.max_recurrence_occurrences,
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        }
    }
}

impl ServiceConfig {
    #[must_use]
    pub fn limit_cfg(&self) -> LimitCfg {
        LimitCfg {
            default: u64::from(self.default_page_size),
            max: u64::from(self.max_page_size),
        }
    }
}

/// Third-party clients the services call out to.
#[derive(Clone)]
pub struct Integrations {
    pub strava: Arc<dyn StravaApi>,
    pub images: Arc<dyn ImageUploader>,
    pub brands: Arc<dyn BrandLookup>,
    /// Key for signing the Strava OAuth `state` parameter.
    pub strava_state_secret: SecretString,
}

// DI container: aggregates all domain services
pub struct AppServices<R: Repositories> {
    pub users: UsersService<R>,
    pub communities: CommunitiesService<R>,
    pub chapters: ChaptersService<R>,
    pub rides: RidesService<R>,
    pub comments: CommentsService<R>,
    pub sponsors: SponsorsService<R>,
    pub strava: Arc<StravaService<R>>,
    pub assets: AssetsService,
}

impl<R: Repositories> AppServices<R> {
    pub fn new(
        repo: R,
        db: DatabaseConnection,
        integrations: Integrations,
        config: ServiceConfig,
    ) -> Self {
        let repo = Arc::new(repo);
        Self {
            users: UsersService::new(Arc::clone(&repo), db.clone(), config.clone()),
            communities: CommunitiesService::new(Arc::clone(&repo), db.clone(), config.clone()),
            chapters: ChaptersService::new(Arc::clone(&repo), db.clone()),
            rides: RidesService::new(Arc::clone(&repo), db.clone(), config.clone()),
            comments: CommentsService::new(Arc::clone(&repo), db.clone(), config),
            sponsors: SponsorsService::new(Arc::clone(&repo), db.clone()),
            strava: Arc::new(StravaService::new(
                repo,
                db,
                integrations.strava,
                integrations.strava_state_secret,
            )),
            assets: AssetsService::new(integrations.images, integrations.brands),
        }
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Lower-case ASCII alphanumerics joined by single dashes.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Trimmed, non-empty and at most `max` characters.
fn required_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(value.to_owned())
}

/// Optional text where blank means "unset".
fn optional_text(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, DomainError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max).map(Some),
    }
}

/// Apply an optional patch value to an optional field; blank clears it.
fn patch_optional(
    target: &mut Option<String>,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<(), DomainError> {
    if value.is_some() {
        *target = optional_text(field, value, max)?;
    }
    Ok(())
}
