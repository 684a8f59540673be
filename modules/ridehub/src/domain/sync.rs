//! Mapping of Strava club events onto local rides and change detection.

use serde::Serialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// A club event as returned by the Strava API, reduced to what sync needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClubEvent {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub route_id: Option<i64>,
    pub upcoming_occurrences: Vec<OffsetDateTime>,
}

/// Ride fields owned by the sync job. Field order is the canonical hash order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedRide {
    pub strava_event_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    pub meeting_point: Option<String>,
    pub route_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
    Skip,
}

pub fn route_url(route_id: i64) -> String {
    format!("https://www.strava.com/routes/{route_id}")
}

/// Map an event to its local ride shape using the next occurrence at or
/// after `now`. Events with nothing upcoming map to `None`.
pub fn map_event(event: &ClubEvent, now: OffsetDateTime) -> Option<SyncedRide> {
    let start_time = event
        .upcoming_occurrences
        .iter()
        .copied()
        .filter(|at| *at >= now)
        .min()?;

    let title = event.title.trim();
    Some(SyncedRide {
        strava_event_id: event.id,
        title: if title.is_empty() {
            format!("Strava event {}", event.id)
        } else {
            title.to_owned()
        },
        description: non_blank(event.description.as_deref()),
        start_time,
        meeting_point: non_blank(event.address.as_deref()),
        route_url: event.route_id.map(route_url),
    })
}

/// Hex SHA-256 over the canonical JSON encoding of the mapped ride.
pub fn content_hash(ride: &SyncedRide) -> String {
    // Serializing a plain struct of strings, integers and timestamps cannot fail.
    let canonical = serde_json::to_vec(ride).unwrap_or_default();
    hex::encode(Sha256::digest(&canonical))
}

/// Decide what to do with a mapped event given the hash stored on the
/// matching local ride, if there is one.
pub fn decide(stored_hash: Option<Option<&str>>, new_hash: &str) -> SyncAction {
    match stored_hash {
        None => SyncAction::Create,
        Some(Some(old)) if old == new_hash => SyncAction::Skip,
        Some(_) => SyncAction::Update,
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn event() -> ClubEvent {
        ClubEvent {
            id: 42,
            title: " Saturday Coffee Ride ".to_owned(),
            description: Some("No drop".to_owned()),
            address: Some("  ".to_owned()),
            route_id: Some(9001),
            upcoming_occurrences: vec![
                datetime!(2026-05-09 08:00 UTC),
                datetime!(2026-05-02 08:00 UTC),
                datetime!(2026-04-25 08:00 UTC),
            ],
        }
    }

    #[test]
    fn picks_next_upcoming_occurrence() {
        let mapped = map_event(&event(), datetime!(2026-04-30 00:00 UTC));
        let mapped = mapped.as_ref().map(|r| (r.start_time, r.title.as_str()));
        assert_eq!(
            mapped,
            Some((datetime!(2026-05-02 08:00 UTC), "Saturday Coffee Ride"))
        );
    }

    #[test]
    fn maps_route_and_blank_address() {
        let Some(mapped) = map_event(&event(), datetime!(2026-01-01 00:00 UTC)) else {
            panic!("event should map");
        };
        assert_eq!(
            mapped.route_url.as_deref(),
            Some("https://www.strava.com/routes/9001")
        );
        assert_eq!(mapped.meeting_point, None);
    }

    #[test]
    fn past_only_events_are_skipped() {
        assert!(map_event(&event(), datetime!(2026-06-01 00:00 UTC)).is_none());
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let now = datetime!(2026-01-01 00:00 UTC);
        let Some(a) = map_event(&event(), now) else {
            panic!("event should map");
        };
        let b = a.clone();
        assert_eq!(content_hash(&a), content_hash(&b));
        assert_eq!(content_hash(&a).len(), 64);

        let mut c = a.clone();
        c.title.push('!');
        assert_ne!(content_hash(&a), content_hash(&c));
    }

    #[test]
    fn decide_create_update_skip() {
        assert_eq!(decide(None, "h1"), SyncAction::Create);
        assert_eq!(decide(Some(Some("h1")), "h1"), SyncAction::Skip);
        assert_eq!(decide(Some(Some("h0")), "h1"), SyncAction::Update);
        assert_eq!(decide(Some(None), "h1"), SyncAction::Update);
    }
}
