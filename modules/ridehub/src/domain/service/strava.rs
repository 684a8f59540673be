//! Strava account connections, club links and the club-event sync.

use std::sync::Arc;

use dashmap::DashSet;
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};
use time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::access::{load_chapter, require_chapter_admin};
use super::now;
use crate::config::SecretString;
use crate::domain::error::DomainError;
use crate::domain::models::{Chapter, Ride, StravaClub, StravaConnection, SyncReport};
use crate::domain::ports::StravaApi;
use crate::domain::recurrence::Cadence;
use crate::domain::repos::Repositories;
use crate::domain::sync::{SyncAction, SyncedRide, content_hash, decide, map_event};

/// Tokens closer than this to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::seconds(60);

pub struct StravaService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
    api: Arc<dyn StravaApi>,
    state_secret: SecretString,
    /// Chapters with a sync in flight in this process.
    running: DashSet<Uuid>,
}

/// Marks a chapter as syncing until dropped.
struct SyncGuard<'a> {
    running: &'a DashSet<Uuid>,
    chapter_id: Uuid,
}

impl<'a> SyncGuard<'a> {
    fn acquire(running: &'a DashSet<Uuid>, chapter_id: Uuid) -> Result<Self, DomainError> {
        if !running.insert(chapter_id) {
            return Err(DomainError::conflict(
                "a Strava sync is already running for this chapter",
            ));
        }
        Ok(Self {
            running,
            chapter_id,
        })
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.running.remove(&self.chapter_id);
    }
}

impl<R: Repositories> StravaService<R> {
    pub fn new(
        repo: Arc<R>,
        db: DatabaseConnection,
        api: Arc<dyn StravaApi>,
        state_secret: SecretString,
    ) -> Self {
        Self {
            repo,
            db,
            api,
            state_secret,
            running: DashSet::new(),
        }
    }

    // ==================== OAuth ====================

    pub fn authorize_url(&self, caller: Uuid) -> Result<String, DomainError> {
        if self.state_secret.is_empty() {
            return Err(DomainError::upstream(
                "strava",
                "Strava integration is not configured",
            ));
        }
        self.api
            .authorize_url(&sign_state(&self.state_secret, caller))
    }

    /// Finish the authorization-code flow. The user is identified by the
    /// signed `state`, not by request credentials.
    #[tracing::instrument(skip(self, code, state))]
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
        scope: Option<&str>,
    ) -> Result<StravaConnection, DomainError> {
        if self.state_secret.is_empty() {
            return Err(DomainError::upstream(
                "strava",
                "Strava integration is not configured",
            ));
        }
        let user_id = verify_state(&self.state_secret, state)
            .ok_or_else(|| DomainError::validation("state", "invalid or tampered state"))?;
        if code.trim().is_empty() {
            return Err(DomainError::validation("code", "must not be empty"));
        }

        let tokens = self.api.exchange_code(code.trim()).await?;
        let athlete_id = tokens.athlete_id.ok_or_else(|| {
            DomainError::upstream("strava", "token response did not identify the athlete")
        })?;

        let connection = StravaConnection {
            user_id,
            athlete_id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
            scope: scope.map(str::to_owned),
            updated_at: now(),
        };
        let saved = self
            .repo
            .upsert_strava_connection(&self.db, connection)
            .await?;
        tracing::info!(user.id = %user_id, athlete_id, "Connected Strava account");
        Ok(saved)
    }

    pub async fn connection(&self, caller: Uuid) -> Result<StravaConnection, DomainError> {
        self.repo
            .find_strava_connection(&self.db, caller)
            .await?
            .ok_or_else(|| DomainError::not_found("StravaConnection", caller))
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn disconnect(&self, caller: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_strava_connection(&self.db, caller).await? {
            return Err(DomainError::not_found("StravaConnection", caller));
        }
        Ok(())
    }

    /// Access token for the stored grant, refreshed and persisted when it
    /// expires within [`REFRESH_MARGIN`].
    async fn access_token(&self, connection: StravaConnection) -> Result<String, DomainError> {
        if connection.expires_at - now() > REFRESH_MARGIN {
            return Ok(connection.access_token);
        }

        tracing::debug!(user.id = %connection.user_id, "Refreshing Strava access token");
        let tokens = self.api.refresh(&connection.refresh_token).await?;
        let refreshed = StravaConnection {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
            updated_at: now(),
            ..connection
        };
        let saved = self
            .repo
            .upsert_strava_connection(&self.db, refreshed)
            .await?;
        Ok(saved.access_token)
    }

    // ==================== Clubs ====================

    pub async fn clubs(&self, caller: Uuid) -> Result<Vec<StravaClub>, DomainError> {
        let connection = self.connection(caller).await?;
        let token = self.access_token(connection).await?;
        self.api.athlete_clubs(&token).await
    }

    /// Link a club the caller belongs to on Strava. Requires chapter admin.
    /// A club mirrors into one chapter only.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn link_club(
        &self,
        caller: Uuid,
        chapter_id: Uuid,
        club_id: i64,
    ) -> Result<Chapter, DomainError> {
        let mut chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;

        if let Some(other) = self
            .repo
            .find_chapter_by_strava_club(&self.db, club_id)
            .await?
            .filter(|other| other.id != chapter_id)
        {
            return Err(DomainError::conflict(format!(
                "Strava club {club_id} is already linked to chapter {}",
                other.id
            )));
        }

        let connection = self
            .repo
            .find_strava_connection(&self.db, caller)
            .await?
            .ok_or_else(|| {
                DomainError::validation("strava", "connect a Strava account before linking a club")
            })?;
        let token = self.access_token(connection).await?;
        let clubs = self.api.athlete_clubs(&token).await?;
        if !clubs.iter().any(|c| c.id == club_id) {
            return Err(DomainError::forbidden(
                "you are not a member of that Strava club",
            ));
        }

        chapter.strava_club_id = Some(club_id);
        chapter.strava_linked_by = Some(caller);
        chapter.updated_at = now();
        self.repo.update_chapter(&self.db, chapter).await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn unlink_club(&self, caller: Uuid, chapter_id: Uuid) -> Result<Chapter, DomainError> {
        let mut chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        chapter.strava_club_id = None;
        chapter.strava_linked_by = None;
        chapter.updated_at = now();
        self.repo.update_chapter(&self.db, chapter).await
    }

    // ==================== Sync ====================

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn sync_chapter(&self, caller: Uuid, chapter_id: Uuid) -> Result<SyncReport, DomainError> {
        let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
        require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        self.run_sync(&chapter).await
    }

    /// Mirror the club's upcoming events into chapter rides.
    ///
    /// Creates rides for unseen events, updates rides whose content hash
    /// changed and leaves the rest alone. A failing event is counted and
    /// the batch goes on.
    #[tracing::instrument(skip(self, chapter), fields(chapter.id = %chapter.id))]
    pub async fn run_sync(&self, chapter: &Chapter) -> Result<SyncReport, DomainError> {
        let (Some(club_id), Some(linked_by)) = (chapter.strava_club_id, chapter.strava_linked_by)
        else {
            return Err(DomainError::validation(
                "strava",
                "chapter has no linked Strava club",
            ));
        };
        let _guard = SyncGuard::acquire(&self.running, chapter.id)?;

        let connection = self
            .repo
            .find_strava_connection(&self.db, linked_by)
            .await?
            .ok_or_else(|| {
                DomainError::validation(
                    "strava",
                    "the user who linked this club is no longer connected to Strava",
                )
            })?;
        let token = self.access_token(connection).await?;
        let events = self.api.upcoming_club_events(&token, club_id).await?;

        let started = now();
        let mut report = SyncReport {
            chapter_id: chapter.id,
            ..SyncReport::default()
        };
        for event in &events {
            let Some(mapped) = map_event(event, started) else {
                continue;
            };
            match self.apply_event(chapter.id, linked_by, mapped).await {
                Ok(SyncAction::Create) => report.created += 1,
                Ok(SyncAction::Update) => report.updated += 1,
                Ok(SyncAction::Skip) => report.unchanged += 1,
                Err(e) => {
                    tracing::warn!(event.id = event.id, error = %e, "Failed to sync Strava event");
                    report.failed += 1;
                    report.errors.push(format!("event {}: {e}", event.id));
                }
            }
        }

        tracing::info!(
            events = events.len(),
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.failed,
            "Strava sync finished"
        );
        Ok(report)
    }

    async fn apply_event(
        &self,
        chapter_id: Uuid,
        linked_by: Uuid,
        mapped: SyncedRide,
    ) -> Result<SyncAction, DomainError> {
        let hash = content_hash(&mapped);
        let existing = self
            .repo
            .find_ride_by_strava_event(&self.db, mapped.strava_event_id)
            .await?;
        if let Some(owner) = existing
            .as_ref()
            .and_then(|r| r.chapter_id)
            .filter(|owner| *owner != chapter_id)
        {
            return Err(DomainError::conflict(format!(
                "Strava event {} is mirrored into chapter {owner}",
                mapped.strava_event_id
            )));
        }
        let action = decide(existing.as_ref().map(|r| r.sync_hash.as_deref()), &hash);
        let ts = now();

        match (action, existing) {
            (SyncAction::Create, _) => {
                let ride = Ride {
                    id: Uuid::now_v7(),
                    chapter_id: Some(chapter_id),
                    created_by: linked_by,
                    title: mapped.title,
                    description: mapped.description,
                    start_time: mapped.start_time,
                    duration_minutes: None,
                    distance_km: None,
                    elevation_m: None,
                    pace: None,
                    meeting_point: mapped.meeting_point,
                    route_url: mapped.route_url,
                    cancelled: false,
                    recurrence: Cadence::None,
                    recurrence_series_id: None,
                    strava_event_id: Some(mapped.strava_event_id),
                    sync_hash: Some(hash),
                    created_at: ts,
                    updated_at: ts,
                };
                self.repo.insert_rides(&self.db, vec![ride]).await?;
            }
            (SyncAction::Update, Some(mut ride)) => {
                ride.title = mapped.title;
                ride.description = mapped.description;
                ride.start_time = mapped.start_time;
                ride.meeting_point = mapped.meeting_point;
                ride.route_url = mapped.route_url;
                ride.sync_hash = Some(hash);
                ride.updated_at = ts;
                self.repo.update_ride(&self.db, ride).await?;
            }
            _ => {}
        }
        Ok(action)
    }

    /// Sync every chapter with a linked club. Failures are logged per chapter.
    pub async fn sync_all_linked(&self) -> Vec<SyncReport> {
        let chapters = match self.repo.list_strava_linked_chapters(&self.db).await {
            Ok(chapters) => chapters,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list chapters linked to Strava");
                return Vec::new();
            }
        };

        let mut reports = Vec::with_capacity(chapters.len());
        for chapter in &chapters {
            match self.run_sync(chapter).await {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(chapter.id = %chapter.id, error = %e, "Chapter sync skipped"),
            }
        }
        reports
    }

    /// Run [`Self::sync_all_linked`] every `every` until `cancel` fires.
    pub async fn run_periodic(self: Arc<Self>, every: std::time::Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; start syncing one period in.
        ticker.tick().await;

        tracing::info!(interval_secs = every.as_secs(), "Periodic Strava sync started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let reports = self.sync_all_linked().await;
                    tracing::debug!(chapters = reports.len(), "Periodic Strava sync pass done");
                }
            }
        }
        tracing::info!("Periodic Strava sync stopped");
    }
}

/// `{user_id}.{hex sha256(secret || user_id)}`
pub fn sign_state(secret: &SecretString, user_id: Uuid) -> String {
    format!("{user_id}.{}", state_digest(secret, user_id))
}

/// The user id carried by a state produced by [`sign_state`] with the same secret.
pub fn verify_state(secret: &SecretString, state: &str) -> Option<Uuid> {
    let (user, digest) = state.trim().split_once('.')?;
    let user_id = Uuid::parse_str(user).ok()?;
    let expected = state_digest(secret, user_id);
    constant_time_eq(expected.as_bytes(), digest.as_bytes()).then_some(user_id)
}

fn state_digest(secret: &SecretString, user_id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.expose().as_bytes());
    hasher.update(user_id.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trip() {
        let secret = SecretString::new("s3cret");
        let user = Uuid::now_v7();
        let state = sign_state(&secret, user);
        assert!(state.starts_with(&user.to_string()));
        assert_eq!(verify_state(&secret, &state), Some(user));
    }

    #[test]
    fn tampered_state_is_rejected() {
        let secret = SecretString::new("s3cret");
        let user = Uuid::now_v7();
        let state = sign_state(&secret, user);

        let other = Uuid::now_v7();
        let (_, digest) = state.split_once('.').unwrap_or_default();
        assert_eq!(verify_state(&secret, &format!("{other}.{digest}")), None);
        assert_eq!(verify_state(&SecretString::new("other"), &state), None);
        assert_eq!(verify_state(&secret, "garbage"), None);
        assert_eq!(verify_state(&secret, &format!("{user}.")), None);
    }

    #[test]
    fn sync_guard_blocks_second_run_until_dropped() {
        let running = DashSet::new();
        let chapter = Uuid::now_v7();
        let guard = SyncGuard::acquire(&running, chapter);
        assert!(guard.is_ok());
        assert!(matches!(
            SyncGuard::acquire(&running, chapter),
            Err(DomainError::Conflict { .. })
        ));
        drop(guard);
        assert!(SyncGuard::acquire(&running, chapter).is_ok());
    }
}
