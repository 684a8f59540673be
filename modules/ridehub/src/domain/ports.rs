//! Outbound ports to third-party services. Implementations live in `infra`.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::error::DomainError;
use crate::domain::models::{BrandInfo, StravaClub, UploadedImage};
use crate::domain::sync::ClubEvent;

/// Token set returned by the Strava OAuth endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct StravaTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
    /// Present on the initial code exchange only.
    pub athlete_id: Option<i64>,
}

impl std::fmt::Debug for StravaTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StravaTokens")
            .field("expires_at", &self.expires_at)
            .field("athlete_id", &self.athlete_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait StravaApi: Send + Sync {
    /// Browser URL that starts the authorization-code flow. Fails when the
    /// client credentials are not configured.
    fn authorize_url(&self, state: &str) -> Result<String, DomainError>;

    async fn exchange_code(&self, code: &str) -> Result<StravaTokens, DomainError>;

    async fn refresh(&self, refresh_token: &str) -> Result<StravaTokens, DomainError>;

    async fn athlete_clubs(&self, access_token: &str) -> Result<Vec<StravaClub>, DomainError>;

    async fn upcoming_club_events(
        &self,
        access_token: &str,
        club_id: i64,
    ) -> Result<Vec<ClubEvent>, DomainError>;
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload an image given as a data URI or a remote URL.
    async fn upload(&self, file: &str, folder: Option<&str>) -> Result<UploadedImage, DomainError>;
}

#[async_trait]
pub trait BrandLookup: Send + Sync {
    /// `Ok(None)` when the provider knows nothing about the domain.
    async fn lookup(&self, domain: &str) -> Result<Option<BrandInfo>, DomainError>;
}
