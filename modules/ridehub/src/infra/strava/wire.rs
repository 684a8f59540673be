//! Strava JSON payloads, reduced to the fields in use.

use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::domain::models::StravaClub;
use crate::domain::sync::ClubEvent;

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    #[serde(default)]
    pub athlete: Option<AthleteSummary>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AthleteSummary {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClubSummary {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub member_count: Option<i64>,
    /// Vanity slug used in the public club URL.
    #[serde(default)]
    pub url: Option<String>,
}

impl From<ClubSummary> for StravaClub {
    fn from(c: ClubSummary) -> Self {
        let slug = c
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| c.id.to_string());
        Self {
            id: c.id,
            name: c.name,
            city: c.city.filter(|s| !s.trim().is_empty()),
            member_count: c.member_count,
            profile_url: Some(format!("https://www.strava.com/clubs/{slug}")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GroupEvent {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub route_id: Option<i64>,
    /// RFC 3339 strings; unparsable entries are dropped.
    #[serde(default)]
    pub upcoming_occurrences: Vec<String>,
}

impl From<GroupEvent> for ClubEvent {
    fn from(e: GroupEvent) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            address: e.address,
            route_id: e.route_id,
            upcoming_occurrences: e
                .upcoming_occurrences
                .iter()
                .filter_map(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn group_event_parses_occurrences() {
        let raw = r#"{
            "id": 7,
            "title": "Tuesday Hills",
            "address": "Cafe Velo",
            "route_id": 123,
            "upcoming_occurrences": ["2026-05-05T17:30:00Z", "not a date", "2026-05-12T17:30:00Z"],
            "organizing_athlete": {"id": 1}
        }"#;
        let event: ClubEvent = serde_json::from_str::<GroupEvent>(raw).unwrap().into();
        assert_eq!(event.id, 7);
        assert_eq!(event.description, None);
        assert_eq!(
            event.upcoming_occurrences,
            vec![datetime!(2026-05-05 17:30 UTC), datetime!(2026-05-12 17:30 UTC)]
        );
    }

    #[test]
    fn club_profile_url_prefers_vanity_slug() {
        let raw = r#"{"id": 99, "name": "Rapha London", "url": "rapha-london", "member_count": 1200}"#;
        let club: StravaClub = serde_json::from_str::<ClubSummary>(raw).unwrap().into();
        assert_eq!(
            club.profile_url.as_deref(),
            Some("https://www.strava.com/clubs/rapha-london")
        );

        let raw = r#"{"id": 99, "name": "No Slug"}"#;
        let club: StravaClub = serde_json::from_str::<ClubSummary>(raw).unwrap().into();
        assert_eq!(club.profile_url.as_deref(), Some("https://www.strava.com/clubs/99"));
    }
}
