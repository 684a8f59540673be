use async_trait::async_trait;
use time::OffsetDateTime;

use super::wire::{ClubSummary, GroupEvent, TokenResponse};
use crate::config::{SecretString, StravaConfig};
use crate::domain::error::DomainError;
use crate::domain::models::StravaClub;
use crate::domain::ports::{StravaApi, StravaTokens};
use crate::domain::sync::ClubEvent;
use crate::infra::http::{build_client, parse_base_url, send_json};

const SERVICE: &str = "strava";

/// `reqwest`-backed [`StravaApi`].
pub struct StravaHttpClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scope: String,
    api_base: String,
    oauth_base: url::Url,
}

impl StravaHttpClient {
    pub fn new(cfg: &StravaConfig) -> anyhow::Result<Self> {
        let api_base = parse_base_url("strava.api_base_url", &cfg.api_base_url)?;
        let oauth_base = parse_base_url("strava.oauth_base_url", &cfg.oauth_base_url)?;
        Ok(Self {
            http: build_client(cfg.http_timeout_secs)?,
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            redirect_uri: cfg.redirect_uri.clone(),
            scope: cfg.scope.clone(),
            api_base: api_base.as_str().trim_end_matches('/').to_owned(),
            oauth_base,
        })
    }

    fn oauth_endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.oauth_base.as_str().trim_end_matches('/'))
    }

    fn ensure_configured(&self) -> Result<(), DomainError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(DomainError::upstream(
                SERVICE,
                "Strava integration is not configured",
            ));
        }
        Ok(())
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<StravaTokens, DomainError> {
        self.ensure_configured()?;
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose()),
        ];
        params.extend_from_slice(form);

        let response: TokenResponse = send_json(
            SERVICE,
            self.http.post(self.oauth_endpoint("token")).form(&params),
        )
        .await?;

        let expires_at = OffsetDateTime::from_unix_timestamp(response.expires_at).map_err(|e| {
            DomainError::upstream(SERVICE, format!("invalid token expiry: {e}"))
        })?;
        Ok(StravaTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
            athlete_id: response.athlete.map(|a| a.id),
        })
    }
}

#[async_trait]
impl StravaApi for StravaHttpClient {
    fn authorize_url(&self, state: &str) -> Result<String, DomainError> {
        self.ensure_configured()?;
        let mut url = self.oauth_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("authorize");
        }
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "auto")
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        Ok(url.into())
    }

    #[tracing::instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<StravaTokens, DomainError> {
        self.token_request(&[("code", code), ("grant_type", "authorization_code")])
            .await
    }

    #[tracing::instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<StravaTokens, DomainError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn athlete_clubs(&self, access_token: &str) -> Result<Vec<StravaClub>, DomainError> {
        let clubs: Vec<ClubSummary> = send_json(
            SERVICE,
            self.http
                .get(format!("{}/athlete/clubs", self.api_base))
                .query(&[("per_page", "200")])
                .bearer_auth(access_token),
        )
        .await?;
        Ok(clubs.into_iter().map(StravaClub::from).collect())
    }

    #[tracing::instrument(skip(self, access_token))]
    async fn upcoming_club_events(
        &self,
        access_token: &str,
        club_id: i64,
    ) -> Result<Vec<ClubEvent>, DomainError> {
        let events: Vec<GroupEvent> = send_json(
            SERVICE,
            self.http
                .get(format!("{}/clubs/{club_id}/group_events", self.api_base))
                .query(&[("upcoming", "true")])
                .bearer_auth(access_token),
        )
        .await?;
        tracing::debug!(count = events.len(), "Fetched Strava club events");
        Ok(events.into_iter().map(ClubEvent::from).collect())
    }
}
