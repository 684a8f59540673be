//! Domain models shared by services, repositories and the REST layer.

use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::permissions::Role;
use crate::domain::recurrence::Cadence;

// ==================== Users ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Upsert payload for the caller's own profile. `None` keeps the stored value,
/// an empty string clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

// ==================== Communities ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunityKind {
    Brand,
    Club,
    Team,
}

impl CommunityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Club => "CLUB",
            Self::Team => "TEAM",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BRAND" => Some(Self::Brand),
            "CLUB" => Some(Self::Club),
            "TEAM" => Some(Self::Team),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub kind: CommunityKind,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub slug: Option<String>,
    pub kind: CommunityKind,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommunityPatch {
    pub name: Option<String>,
    pub kind: Option<CommunityKind>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommunityFilter {
    pub kind: Option<CommunityKind>,
    pub search: Option<String>,
}

// ==================== Chapters ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: Uuid,
    pub community_id: Uuid,
    pub slug: String,
    pub name: String,
    pub city: String,
    pub description: Option<String>,
    pub strava_club_id: Option<i64>,
    pub strava_linked_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewChapter {
    pub name: String,
    pub slug: Option<String>,
    pub city: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChapterPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDetails {
    pub chapter: Chapter,
    pub member_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMember {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub joined_at: OffsetDateTime,
}

// ==================== Rides ====================

#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: OffsetDateTime,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub cancelled: bool,
    pub recurrence: Cadence,
    pub recurrence_series_id: Option<Uuid>,
    pub strava_event_id: Option<i64>,
    pub sync_hash: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRide {
    pub chapter_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: OffsetDateTime,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub recurrence: Cadence,
    pub recurrence_end_date: Option<Date>,
    pub recurrence_count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct RidePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<OffsetDateTime>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub cancelled: Option<bool>,
}

/// Which rides of a recurrence series an edit or delete applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesScope {
    #[default]
    Single,
    Future,
    Series,
}

impl SeriesScope {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "this" => Some(Self::Single),
            "future" | "following" => Some(Self::Future),
            "series" | "all" => Some(Self::Series),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RideFilter {
    pub chapter_id: Option<Uuid>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub include_cancelled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideDetails {
    pub ride: Ride,
    pub rsvp_counts: RsvpCounts,
    pub my_rsvp: Option<RsvpStatus>,
}

/// Outcome of creating a ride, possibly expanded into a series.
#[derive(Debug, Clone)]
pub struct CreatedRides {
    pub rides: Vec<Ride>,
    /// The recurrence rule produced more dates than the configured cap allows.
    pub truncated: bool,
}

// ==================== RSVPs ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpStatus {
    Going,
    Maybe,
    NotGoing,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Going => "GOING",
            Self::Maybe => "MAYBE",
            Self::NotGoing => "NOT_GOING",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "GOING" | "YES" => Some(Self::Going),
            "MAYBE" => Some(Self::Maybe),
            "NOT_GOING" | "NOTGOING" | "NO" => Some(Self::NotGoing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsvpCounts {
    pub going: u64,
    pub maybe: u64,
    pub not_going: u64,
}

// ==================== Comments ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

// ==================== Sponsors ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sponsor {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSponsor {
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct SponsorPatch {
    pub name: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: Option<i32>,
}

// ==================== Strava ====================

#[derive(Clone, PartialEq, Eq)]
pub struct StravaConnection {
    pub user_id: Uuid,
    pub athlete_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
    pub scope: Option<String>,
    pub updated_at: OffsetDateTime,
}

impl std::fmt::Debug for StravaConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StravaConnection")
            .field("user_id", &self.user_id)
            .field("athlete_id", &self.athlete_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StravaClub {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub member_count: Option<i64>,
    pub profile_url: Option<String>,
}

/// Tally of one chapter sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub chapter_id: Uuid,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

// ==================== Assets ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandInfo {
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub icon_url: Option<String>,
}

// ==================== Paging ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

impl LimitCfg {
    /// Clamp a requested page to `[1, max]`, falling back to the default size.
    pub fn resolve(self, req: PageRequest) -> (u64, u64) {
        let limit = req.limit.unwrap_or(self.default).clamp(1, self.max.max(1));
        (limit, req.offset.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            offset: self.offset,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsvp_status_parsing_is_lenient() {
        assert_eq!(RsvpStatus::parse("going"), Some(RsvpStatus::Going));
        assert_eq!(RsvpStatus::parse(" Not-Going "), Some(RsvpStatus::NotGoing));
        assert_eq!(RsvpStatus::parse("not going"), Some(RsvpStatus::NotGoing));
        assert_eq!(RsvpStatus::parse("MAYBE"), Some(RsvpStatus::Maybe));
        assert_eq!(RsvpStatus::parse("perhaps"), None);
    }

    #[test]
    fn limit_cfg_clamps() {
        let cfg = LimitCfg { default: 20, max: 100 };
        assert_eq!(cfg.resolve(PageRequest::default()), (20, 0));
        assert_eq!(
            cfg.resolve(PageRequest {
                limit: Some(1000),
                offset: Some(5)
            }),
            (100, 5)
        );
        assert_eq!(
            cfg.resolve(PageRequest {
                limit: Some(0),
                offset: None
            }),
            (1, 0)
        );
    }

    #[test]
    fn strava_connection_debug_hides_tokens() {
        let now = OffsetDateTime::now_utc();
        let c = StravaConnection {
            user_id: Uuid::nil(),
            athlete_id: 7,
            access_token: "secret-access".to_owned(),
            refresh_token: "secret-refresh".to_owned(),
            expires_at: now,
            scope: None,
            updated_at: now,
        };
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-access"));
        assert!(!dbg.contains("secret-refresh"));
    }
}
