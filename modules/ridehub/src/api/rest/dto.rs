use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{
    BrandInfo, Chapter, ChapterDetails, ChapterMember, ChapterPatch, Comment, Community,
    CommunityFilter, CommunityKind, CommunityPatch, CreatedRides, NewChapter, NewCommunity,
    NewRide, NewSponsor, Page, PageRequest, ProfileUpdate, Ride, RideDetails, RideFilter,
    RidePatch, Rsvp, RsvpCounts, SeriesScope, Sponsor, SponsorPatch, StravaClub,
    StravaConnection, SyncReport, UploadedImage, User,
};
use crate::domain::recurrence::Cadence;

// ==================== Shared ====================

#[derive(Debug, Clone, Serialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

impl<T> PageDto<T> {
    pub fn from_page<M>(page: Page<M>, f: impl FnMut(M) -> T) -> Self {
        let page = page.map_items(f);
        Self {
            items: page.items,
            limit: page.limit,
            offset: page.offset,
            total: page.total,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    pub scope: Option<String>,
}

impl ScopeQuery {
    pub fn parse(&self) -> Result<SeriesScope, DomainError> {
        match self.scope.as_deref() {
            None => Ok(SeriesScope::Single),
            Some(raw) => SeriesScope::parse(raw).ok_or_else(|| {
                DomainError::validation("scope", format!("unknown scope '{raw}'"))
            }),
        }
    }
}

fn parse_timestamp(field: &str, raw: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| DomainError::validation(field, "expected an RFC 3339 timestamp"))
}

fn parse_date(field: &str, raw: &str) -> Result<Date, DomainError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| DomainError::validation(field, "expected a YYYY-MM-DD date"))
}

fn parse_kind(raw: &str) -> Result<CommunityKind, DomainError> {
    CommunityKind::parse(raw)
        .ok_or_else(|| DomainError::validation("kind", format!("unknown community kind '{raw}'")))
}

// ==================== Users ====================

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            location: u.location,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsertProfileReq {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

impl From<UpsertProfileReq> for ProfileUpdate {
    fn from(req: UpsertProfileReq) -> Self {
        Self {
            email: req.email,
            display_name: req.display_name,
            bio: req.bio,
            avatar_url: req.avatar_url,
            location: req.location,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

// ==================== Communities ====================

#[derive(Debug, Clone, Serialize)]
pub struct CommunityDto {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub kind: &'static str,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Community> for CommunityDto {
    fn from(c: Community) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            name: c.name,
            kind: c.kind.as_str(),
            description: c.description,
            website: c.website,
            logo_url: c.logo_url,
            owner_id: c.owner_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityQuery {
    pub kind: Option<String>,
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl CommunityQuery {
    pub fn split(self) -> Result<(CommunityFilter, PageRequest), DomainError> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_kind(raw)?),
        };
        Ok((
            CommunityFilter {
                kind,
                search: self.q,
            },
            PageRequest {
                limit: self.limit,
                offset: self.offset,
            },
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommunityReq {
    pub name: String,
    pub slug: Option<String>,
    pub kind: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

impl TryFrom<CreateCommunityReq> for NewCommunity {
    type Error = DomainError;

    fn try_from(req: CreateCommunityReq) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_kind(&req.kind)?,
            name: req.name,
            slug: req.slug,
            description: req.description,
            website: req.website,
            logo_url: req.logo_url,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommunityReq {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
}

impl TryFrom<UpdateCommunityReq> for CommunityPatch {
    type Error = DomainError;

    fn try_from(req: UpdateCommunityReq) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: req.kind.as_deref().map(parse_kind).transpose()?,
            name: req.name,
            description: req.description,
            website: req.website,
            logo_url: req.logo_url,
        })
    }
}

// ==================== Chapters ====================

#[derive(Debug, Clone, Serialize)]
pub struct ChapterDto {
    pub id: Uuid,
    pub community_id: Uuid,
    pub slug: String,
    pub name: String,
    pub city: String,
    pub description: Option<String>,
    pub strava_club_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Chapter> for ChapterDto {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            community_id: c.community_id,
            slug: c.slug,
            name: c.name,
            city: c.city,
            description: c.description,
            strava_club_id: c.strava_club_id,
            member_count: None,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<ChapterDetails> for ChapterDto {
    fn from(d: ChapterDetails) -> Self {
        Self {
            member_count: Some(d.member_count),
            ..Self::from(d.chapter)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChapterReq {
    pub name: String,
    pub slug: Option<String>,
    pub city: String,
    pub description: Option<String>,
}

impl From<CreateChapterReq> for NewChapter {
    fn from(req: CreateChapterReq) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            city: req.city,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateChapterReq {
    pub name: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateChapterReq> for ChapterPatch {
    fn from(req: UpdateChapterReq) -> Self {
        Self {
            name: req.name,
            city: req.city,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDto {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub user_id: Uuid,
    pub role: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

impl From<ChapterMember> for MemberDto {
    fn from(m: ChapterMember) -> Self {
        Self {
            id: m.id,
            chapter_id: m.chapter_id,
            user_id: m.user_id,
            role: m.role.as_str(),
            joined_at: m.joined_at,
        }
    }
}

fn default_member_role() -> String {
    "MEMBER".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMemberReq {
    pub user_id: Uuid,
    #[serde(default = "default_member_role")]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRoleReq {
    pub role: String,
}

// ==================== Rides ====================

#[derive(Debug, Clone, Serialize)]
pub struct RideDto {
    pub id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub cancelled: bool,
    pub recurrence: &'static str,
    pub recurrence_series_id: Option<Uuid>,
    pub strava_event_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Ride> for RideDto {
    fn from(r: Ride) -> Self {
        Self {
            id: r.id,
            chapter_id: r.chapter_id,
            created_by: r.created_by,
            title: r.title,
            description: r.description,
            start_time: r.start_time,
            duration_minutes: r.duration_minutes,
            distance_km: r.distance_km,
            elevation_m: r.elevation_m,
            pace: r.pace,
            meeting_point: r.meeting_point,
            route_url: r.route_url,
            cancelled: r.cancelled,
            recurrence: r.recurrence.as_str(),
            recurrence_series_id: r.recurrence_series_id,
            strava_event_id: r.strava_event_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RsvpCountsDto {
    pub going: u64,
    pub maybe: u64,
    pub not_going: u64,
}

impl From<RsvpCounts> for RsvpCountsDto {
    fn from(c: RsvpCounts) -> Self {
        Self {
            going: c.going,
            maybe: c.maybe,
            not_going: c.not_going,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RideDetailsDto {
    #[serde(flatten)]
    pub ride: RideDto,
    pub rsvp_counts: RsvpCountsDto,
    pub my_rsvp: Option<&'static str>,
}

impl From<RideDetails> for RideDetailsDto {
    fn from(d: RideDetails) -> Self {
        Self {
            ride: d.ride.into(),
            rsvp_counts: d.rsvp_counts.into(),
            my_rsvp: d.my_rsvp.map(|s| s.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedRidesDto {
    pub rides: Vec<RideDto>,
    pub truncated: bool,
}

impl From<CreatedRides> for CreatedRidesDto {
    fn from(c: CreatedRides) -> Self {
        Self {
            rides: c.rides.into_iter().map(RideDto::from).collect(),
            truncated: c.truncated,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RideListQuery {
    pub chapter_id: Option<Uuid>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub include_cancelled: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl RideListQuery {
    pub fn split(self) -> Result<(RideFilter, PageRequest), DomainError> {
        Ok((
            RideFilter {
                chapter_id: self.chapter_id,
                from: self.from.as_deref().map(|raw| parse_timestamp("from", raw)).transpose()?,
                to: self.to.as_deref().map(|raw| parse_timestamp("to", raw)).transpose()?,
                include_cancelled: self.include_cancelled,
            },
            PageRequest {
                limit: self.limit,
                offset: self.offset,
            },
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRideReq {
    pub chapter_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub recurrence: Option<String>,
    pub recurrence_end_date: Option<String>,
    pub recurrence_count: Option<u32>,
}

impl TryFrom<CreateRideReq> for NewRide {
    type Error = DomainError;

    fn try_from(req: CreateRideReq) -> Result<Self, Self::Error> {
        let recurrence = match req.recurrence.as_deref() {
            None => Cadence::None,
            Some(raw) => Cadence::parse(raw).ok_or_else(|| {
                DomainError::validation("recurrence", format!("unknown recurrence '{raw}'"))
            })?,
        };
        Ok(Self {
            chapter_id: req.chapter_id,
            title: req.title,
            description: req.description,
            start_time: parse_timestamp("start_time", &req.start_time)?,
            duration_minutes: req.duration_minutes,
            distance_km: req.distance_km,
            elevation_m: req.elevation_m,
            pace: req.pace,
            meeting_point: req.meeting_point,
            route_url: req.route_url,
            recurrence,
            recurrence_end_date: req
                .recurrence_end_date
                .as_deref()
                .map(|raw| parse_date("recurrence_end_date", raw))
                .transpose()?,
            recurrence_count: req.recurrence_count,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRideReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<i32>,
    pub pace: Option<String>,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
    pub cancelled: Option<bool>,
}

impl TryFrom<UpdateRideReq> for RidePatch {
    type Error = DomainError;

    fn try_from(req: UpdateRideReq) -> Result<Self, Self::Error> {
        Ok(Self {
            start_time: req
                .start_time
                .as_deref()
                .map(|raw| parse_timestamp("start_time", raw))
                .transpose()?,
            title: req.title,
            description: req.description,
            duration_minutes: req.duration_minutes,
            distance_km: req.distance_km,
            elevation_m: req.elevation_m,
            pace: req.pace,
            meeting_point: req.meeting_point,
            route_url: req.route_url,
            cancelled: req.cancelled,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeletedDto {
    pub deleted: u64,
}

// ==================== RSVPs & comments ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsvpReq {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpDto {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Rsvp> for RsvpDto {
    fn from(r: Rsvp) -> Self {
        Self {
            id: r.id,
            ride_id: r.ride_id,
            user_id: r.user_id,
            status: r.status.as_str(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentReq {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            ride_id: c.ride_id,
            author_id: c.author_id,
            body: c.body,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// ==================== Sponsors ====================

#[derive(Debug, Clone, Serialize)]
pub struct SponsorDto {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Sponsor> for SponsorDto {
    fn from(s: Sponsor) -> Self {
        Self {
            id: s.id,
            chapter_id: s.chapter_id,
            name: s.name,
            website: s.website,
            logo_url: s.logo_url,
            tier: s.tier,
            position: s.position,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSponsorReq {
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: Option<i32>,
}

impl From<CreateSponsorReq> for NewSponsor {
    fn from(req: CreateSponsorReq) -> Self {
        Self {
            name: req.name,
            website: req.website,
            logo_url: req.logo_url,
            tier: req.tier,
            position: req.position,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSponsorReq {
    pub name: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub tier: Option<String>,
    pub position: Option<i32>,
}

impl From<UpdateSponsorReq> for SponsorPatch {
    fn from(req: UpdateSponsorReq) -> Self {
        Self {
            name: req.name,
            website: req.website,
            logo_url: req.logo_url,
            tier: req.tier,
            position: req.position,
        }
    }
}

// ==================== Strava ====================

#[derive(Debug, Clone, Serialize)]
pub struct ConnectUrlDto {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
    /// Set by Strava when the athlete denies access.
    pub error: Option<String>,
}

/// Connection status; tokens never leave the server.
#[derive(Debug, Clone, Serialize)]
pub struct StravaConnectionDto {
    pub athlete_id: i64,
    pub scope: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<StravaConnection> for StravaConnectionDto {
    fn from(c: StravaConnection) -> Self {
        Self {
            athlete_id: c.athlete_id,
            scope: c.scope,
            expires_at: c.expires_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StravaClubDto {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub member_count: Option<i64>,
    pub profile_url: Option<String>,
}

impl From<StravaClub> for StravaClubDto {
    fn from(c: StravaClub) -> Self {
        Self {
            id: c.id,
            name: c.name,
            city: c.city,
            member_count: c.member_count,
            profile_url: c.profile_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkClubReq {
    pub club_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReportDto {
    pub chapter_id: Uuid,
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

impl From<SyncReport> for SyncReportDto {
    fn from(r: SyncReport) -> Self {
        Self {
            chapter_id: r.chapter_id,
            created: r.created,
            updated: r.updated,
            unchanged: r.unchanged,
            failed: r.failed,
            errors: r.errors,
        }
    }
}

// ==================== Assets ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadImageReq {
    /// Data URI or remote http(s) URL.
    pub file: String,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedImageDto {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<UploadedImage> for UploadedImageDto {
    fn from(i: UploadedImage) -> Self {
        Self {
            url: i.url,
            public_id: i.public_id,
            width: i.width,
            height: i.height,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandQuery {
    pub domain: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandDto {
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub icon_url: Option<String>,
}

impl From<BrandInfo> for BrandDto {
    fn from(b: BrandInfo) -> Self {
        Self {
            name: b.name,
            domain: b.domain,
            logo_url: b.logo_url,
            icon_url: b.icon_url,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn ride_req() -> CreateRideReq {
        serde_json::from_value(serde_json::json!({
            "title": "Tuesday Hills",
            "start_time": "2026-05-05T18:30:00+02:00",
            "recurrence": "weekly",
            "recurrence_end_date": "2026-06-30"
        }))
        .unwrap()
    }

    #[test]
    fn create_ride_request_parses_times_and_cadence() {
        let ride = NewRide::try_from(ride_req()).unwrap();
        assert_eq!(ride.start_time, datetime!(2026-05-05 18:30 +02:00));
        assert_eq!(ride.recurrence, Cadence::Weekly);
        assert_eq!(ride.recurrence_end_date, Some(date!(2026-06-30)));
    }

    #[test]
    fn bad_values_become_validation_errors() {
        let mut req = ride_req();
        req.start_time = "next tuesday".to_owned();
        assert!(matches!(
            NewRide::try_from(req),
            Err(DomainError::Validation { .. })
        ));

        let mut req = ride_req();
        req.recurrence = Some("yearly".to_owned());
        assert!(matches!(
            NewRide::try_from(req),
            Err(DomainError::Validation { .. })
        ));

        let q = ScopeQuery {
            scope: Some("everything".to_owned()),
        };
        assert!(q.parse().is_err());
    }

    #[test]
    fn ride_details_flatten_ride_fields() {
        let ride = NewRide::try_from(ride_req()).unwrap();
        let ts = datetime!(2026-05-01 00:00 UTC);
        let details = RideDetails {
            ride: Ride {
                id: Uuid::nil(),
                chapter_id: None,
                created_by: Uuid::nil(),
                title: ride.title,
                description: None,
                start_time: ride.start_time,
                duration_minutes: None,
                distance_km: Some(42.5),
                elevation_m: None,
                pace: None,
                meeting_point: None,
                route_url: None,
                cancelled: false,
                recurrence: Cadence::None,
                recurrence_series_id: None,
                strava_event_id: None,
                sync_hash: Some("secret-ish".to_owned()),
                created_at: ts,
                updated_at: ts,
            },
            rsvp_counts: RsvpCounts {
                going: 3,
                maybe: 1,
                not_going: 0,
            },
            my_rsvp: None,
        };
        let json = serde_json::to_value(RideDetailsDto::from(details)).unwrap();
        assert_eq!(json["title"], "Tuesday Hills");
        assert_eq!(json["rsvp_counts"]["going"], 3);
        assert_eq!(json["recurrence"], "NONE");
        assert!(json.get("sync_hash").is_none());
    }
}
