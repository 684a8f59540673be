//! Conversions between `SeaORM` models and domain models.
//!
//! Enum columns are stored as upper-case strings; a value this code does not
//! recognise is reported as a database error instead of being guessed.

use crate::domain::error::DomainError;
use crate::domain::models::{
    Chapter, ChapterMember, Comment, Community, CommunityKind, Ride, Rsvp, RsvpStatus, Sponsor,
    StravaConnection, User,
};
use crate::domain::permissions::normalize_role;
use crate::domain::recurrence::Cadence;
use crate::infra::storage::entity::{
    chapter, chapter_member, comment, community, ride, rsvp, sponsor, strava_connection, user,
};

fn bad_enum(column: &str, value: &str) -> DomainError {
    tracing::error!(column, value, "unrecognised enum value in storage");
    DomainError::database(format!("unexpected {column} value '{value}'"))
}

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            display_name: m.display_name,
            bio: m.bio,
            avatar_url: m.avatar_url,
            location: m.location,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl TryFrom<community::Model> for Community {
    type Error = DomainError;

    fn try_from(m: community::Model) -> Result<Self, Self::Error> {
        let kind = CommunityKind::parse(&m.kind).ok_or_else(|| bad_enum("communities.kind", &m.kind))?;
        Ok(Self {
            id: m.id,
            slug: m.slug,
            name: m.name,
            kind,
            description: m.description,
            website: m.website,
            logo_url: m.logo_url,
            owner_id: m.owner_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<chapter::Model> for Chapter {
    fn from(m: chapter::Model) -> Self {
        Self {
            id: m.id,
            community_id: m.community_id,
            slug: m.slug,
            name: m.name,
            city: m.city,
            description: m.description,
            strava_club_id: m.strava_club_id,
            strava_linked_by: m.strava_linked_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl TryFrom<chapter_member::Model> for ChapterMember {
    type Error = DomainError;

    fn try_from(m: chapter_member::Model) -> Result<Self, Self::Error> {
        let role = normalize_role(&m.role).ok_or_else(|| bad_enum("chapter_members.role", &m.role))?;
        Ok(Self {
            id: m.id,
            chapter_id: m.chapter_id,
            user_id: m.user_id,
            role,
            joined_at: m.joined_at,
        })
    }
}

impl TryFrom<ride::Model> for Ride {
    type Error = DomainError;

    fn try_from(m: ride::Model) -> Result<Self, Self::Error> {
        let recurrence =
            Cadence::parse(&m.recurrence).ok_or_else(|| bad_enum("rides.recurrence", &m.recurrence))?;
        Ok(Self {
            id: m.id,
            chapter_id: m.chapter_id,
            created_by: m.created_by,
            title: m.title,
            description: m.description,
            start_time: m.start_time,
            duration_minutes: m.duration_minutes,
            distance_km: m.distance_km,
            elevation_m: m.elevation_m,
            pace: m.pace,
            meeting_point: m.meeting_point,
            route_url: m.route_url,
            cancelled: m.cancelled,
            recurrence,
            recurrence_series_id: m.recurrence_series_id,
            strava_event_id: m.strava_event_id,
            sync_hash: m.sync_hash,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<Ride> for ride::ActiveModel {
    fn from(r: Ride) -> Self {
        use sea_orm::Set;
        Self {
            id: Set(r.id),
            chapter_id: Set(r.chapter_id),
            created_by: Set(r.created_by),
            title: Set(r.title),
            description: Set(r.description),
            start_time: Set(r.start_time),
            duration_minutes: Set(r.duration_minutes),
            distance_km: Set(r.distance_km),
            elevation_m: Set(r.elevation_m),
            pace: Set(r.pace),
            meeting_point: Set(r.meeting_point),
            route_url: Set(r.route_url),
            cancelled: Set(r.cancelled),
            recurrence: Set(r.recurrence.as_str().to_owned()),
            recurrence_series_id: Set(r.recurrence_series_id),
            strava_event_id: Set(r.strava_event_id),
            sync_hash: Set(r.sync_hash),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        }
    }
}

impl TryFrom<rsvp::Model> for Rsvp {
    type Error = DomainError;

    fn try_from(m: rsvp::Model) -> Result<Self, Self::Error> {
        let status = RsvpStatus::parse(&m.status).ok_or_else(|| bad_enum("rsvps.status", &m.status))?;
        Ok(Self {
            id: m.id,
            ride_id: m.ride_id,
            user_id: m.user_id,
            status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<comment::Model> for Comment {
    fn from(m: comment::Model) -> Self {
        Self {
            id: m.id,
            ride_id: m.ride_id,
            author_id: m.author_id,
            body: m.body,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<sponsor::Model> for Sponsor {
    fn from(m: sponsor::Model) -> Self {
        Self {
            id: m.id,
            chapter_id: m.chapter_id,
            name: m.name,
            website: m.website,
            logo_url: m.logo_url,
            tier: m.tier,
            position: m.position,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<strava_connection::Model> for StravaConnection {
    fn from(m: strava_connection::Model) -> Self {
        Self {
            user_id: m.user_id,
            athlete_id: m.athlete_id,
            access_token: m.access_token,
            refresh_token: m.refresh_token,
            expires_at: m.expires_at,
            scope: m.scope,
            updated_at: m.updated_at,
        }
    }
}

/// Convert a list of models, failing on the first unreadable row.
pub(crate) fn try_collect<M, T>(models: Vec<M>) -> Result<Vec<T>, DomainError>
where
    T: TryFrom<M, Error = DomainError>,
{
    models.into_iter().map(T::try_from).collect()
}
