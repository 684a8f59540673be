#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tokio::sync::Notify;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use ridehub::config::{RideHubConfig, SecretString};
use ridehub::domain::error::DomainError;
use ridehub::domain::models::{
    BrandInfo, Chapter, Community, CommunityKind, NewChapter, NewCommunity, NewRide,
    ProfileUpdate, Ride, StravaClub, UploadedImage,
};
use ridehub::domain::ports::{BrandLookup, ImageUploader, StravaApi, StravaTokens};
use ridehub::domain::recurrence::Cadence;
use ridehub::domain::service::{Integrations, sign_state};
use ridehub::domain::sync::ClubEvent;
use ridehub::infra::storage::db::connect;
use ridehub::{RideHub, Services};

pub const STATE_SECRET: &str = "test-state-secret";
pub const ATHLETE_ID: i64 = 4242;

/// Create a fresh in-memory `SQLite` database with migrations applied.
pub async fn inmem_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:", 1)
        .await
        .expect("Failed to connect to in-memory database");
    ridehub::module::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

/// Scriptable Strava API: returns whatever the test puts in.
pub struct FakeStrava {
    pub clubs: Mutex<Vec<StravaClub>>,
    pub events: Mutex<Vec<ClubEvent>>,
    /// Expiry handed out by the initial code exchange.
    pub initial_expiry: Mutex<OffsetDateTime>,
    pub refreshes: AtomicUsize,
    pub tokens_seen: Mutex<Vec<String>>,
    /// When set, event fetches pause until the test releases them.
    pub gate: Mutex<Option<EventGate>>,
}

/// Holds `upcoming_club_events` open: `entered` fires on arrival, `release` lets it return.
#[derive(Clone, Default)]
pub struct EventGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Default for FakeStrava {
    fn default() -> Self {
        Self {
            clubs: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            initial_expiry: Mutex::new(OffsetDateTime::now_utc() + Duration::hours(6)),
            refreshes: AtomicUsize::new(0),
            tokens_seen: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }
}

impl FakeStrava {
    pub fn set_clubs(&self, clubs: Vec<StravaClub>) {
        *self.clubs.lock().unwrap() = clubs;
    }

    pub fn set_events(&self, events: Vec<ClubEvent>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn hold_events(&self) -> EventGate {
        let gate = EventGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.tokens_seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StravaApi for FakeStrava {
    fn authorize_url(&self, state: &str) -> Result<String, DomainError> {
        Ok(format!("https://strava.test/oauth/authorize?state={state}"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<StravaTokens, DomainError> {
        Ok(StravaTokens {
            access_token: "access-0".to_owned(),
            refresh_token: "refresh-0".to_owned(),
            expires_at: *self.initial_expiry.lock().unwrap(),
            athlete_id: Some(ATHLETE_ID),
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<StravaTokens, DomainError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StravaTokens {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
            expires_at: OffsetDateTime::now_utc() + Duration::hours(6),
            athlete_id: None,
        })
    }

    async fn athlete_clubs(&self, access_token: &str) -> Result<Vec<StravaClub>, DomainError> {
        self.tokens_seen.lock().unwrap().push(access_token.to_owned());
        Ok(self.clubs.lock().unwrap().clone())
    }

    async fn upcoming_club_events(
        &self,
        access_token: &str,
        _club_id: i64,
    ) -> Result<Vec<ClubEvent>, DomainError> {
        self.tokens_seen.lock().unwrap().push(access_token.to_owned());
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(self.events.lock().unwrap().clone())
    }
}

pub struct FakeImages;

#[async_trait]
impl ImageUploader for FakeImages {
    async fn upload(&self, file: &str, folder: Option<&str>) -> Result<UploadedImage, DomainError> {
        let folder = folder.unwrap_or("ridehub");
        Ok(UploadedImage {
            url: format!("https://images.test/{folder}/{}.png", file.len()),
            public_id: format!("{folder}/{}", file.len()),
            width: Some(64),
            height: Some(64),
        })
    }
}

pub struct FakeBrands;

#[async_trait]
impl BrandLookup for FakeBrands {
    async fn lookup(&self, domain: &str) -> Result<Option<BrandInfo>, DomainError> {
        if domain == "unknown.test" {
            return Ok(None);
        }
        Ok(Some(BrandInfo {
            name: "Rapha".to_owned(),
            domain: domain.to_owned(),
            logo_url: Some(format!("https://logos.test/{domain}.svg")),
            icon_url: None,
        }))
    }
}

/// Everything a test needs: the wired app, its services and the Strava fake.
pub struct Harness {
    pub db: DatabaseConnection,
    pub app: RideHub,
    pub svc: Arc<Services>,
    pub strava: Arc<FakeStrava>,
}

pub fn test_config() -> RideHubConfig {
    let mut cfg = RideHubConfig::default();
    cfg.auth.disabled = true;
    cfg.max_recurrence_occurrences = 10;
    cfg
}

pub async fn harness() -> Harness {
    harness_with(test_config()).await
}

pub async fn harness_with(cfg: RideHubConfig) -> Harness {
    let db = inmem_db().await;
    let strava = Arc::new(FakeStrava::default());
    let integrations = Integrations {
        strava: strava.clone(),
        images: Arc::new(FakeImages),
        brands: Arc::new(FakeBrands),
        strava_state_secret: SecretString::new(STATE_SECRET),
    };
    let app = RideHub::from_parts(db.clone(), &cfg, integrations).expect("wire app");
    let svc = app.services();
    Harness {
        db,
        app,
        svc,
        strava,
    }
}

pub async fn user(svc: &Services, email: &str) -> Uuid {
    let id = Uuid::now_v7();
    svc.users
        .upsert_profile(
            id,
            ProfileUpdate {
                email: Some(email.to_owned()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("create profile");
    id
}

pub async fn community(svc: &Services, owner: Uuid, name: &str) -> Community {
    svc.communities
        .create_community(
            owner,
            NewCommunity {
                name: name.to_owned(),
                slug: None,
                kind: CommunityKind::Club,
                description: None,
                website: None,
                logo_url: None,
            },
        )
        .await
        .expect("create community")
}

/// A community owned by `owner` with one chapter; `owner` is the chapter OWNER.
pub async fn chapter(svc: &Services, owner: Uuid, name: &str) -> Chapter {
    let community = community(svc, owner, &format!("{name} Cycling")).await;
    svc.chapters
        .create_chapter(
            owner,
            community.id,
            NewChapter {
                name: name.to_owned(),
                slug: None,
                city: name.to_owned(),
                description: None,
            },
        )
        .await
        .expect("create chapter")
}

pub fn new_ride(chapter_id: Option<Uuid>, title: &str, start: OffsetDateTime) -> NewRide {
    NewRide {
        chapter_id,
        title: title.to_owned(),
        description: None,
        start_time: start,
        duration_minutes: Some(120),
        distance_km: Some(60.0),
        elevation_m: Some(450),
        pace: Some("28-30 km/h".to_owned()),
        meeting_point: Some("Cafe Velo".to_owned()),
        route_url: None,
        recurrence: Cadence::None,
        recurrence_end_date: None,
        recurrence_count: None,
    }
}

pub async fn single_ride(svc: &Services, caller: Uuid, chapter_id: Option<Uuid>) -> Ride {
    let start = OffsetDateTime::now_utc() + Duration::days(3);
    let mut created = svc
        .rides
        .create_ride(caller, new_ride(chapter_id, "Tuesday Hammer", start))
        .await
        .expect("create ride");
    created.rides.remove(0)
}

/// Run the OAuth callback for `user_id` so a Strava connection exists.
pub async fn connect_strava(svc: &Services, user_id: Uuid) {
    let state = sign_state(&SecretString::new(STATE_SECRET), user_id);
    svc.strava
        .complete_authorization("auth-code", &state, Some("read"))
        .await
        .expect("complete authorization");
}

pub fn club_event(id: i64, title: &str, at: OffsetDateTime) -> ClubEvent {
    ClubEvent {
        id,
        title: title.to_owned(),
        description: Some("No drop".to_owned()),
        address: Some("Town square".to_owned()),
        route_id: None,
        upcoming_occurrences: vec![at],
    }
}
