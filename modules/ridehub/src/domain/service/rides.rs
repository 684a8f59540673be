use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use super::access::{can_manage_ride, load_chapter, load_ride, require_chapter_admin};
use super::{ServiceConfig, now, optional_text, patch_optional, required_text};
use crate::domain::error::DomainError;
use crate::domain::models::{
    CreatedRides, NewRide, Page, PageRequest, Ride, RideDetails, RideFilter, RidePatch, Rsvp,
    RsvpStatus, SeriesScope,
};
use crate::domain::recurrence;
use crate::domain::repos::Repositories;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 5000;
const MAX_PACE_LENGTH: usize = 64;
const MAX_TEXT_LENGTH: usize = 500;
const MAX_URL_LENGTH: usize = 2048;

/// Rides, recurrence series and RSVPs.
pub struct RidesService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
    config: ServiceConfig,
}

impl<R: Repositories> RidesService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection, config: ServiceConfig) -> Self {
        Self { repo, db, config }
    }

    /// Upcoming rides by default: `from` falls back to now.
    pub async fn list_rides(
        &self,
        mut filter: RideFilter,
        page: PageRequest,
    ) -> Result<Page<Ride>, DomainError> {
        let (limit, offset) = self.config.limit_cfg().resolve(page);
        filter.from = Some(filter.from.map_or_else(now, to_utc));
        filter.to = filter.to.map(to_utc);
        self.repo.list_rides(&self.db, &filter, limit, offset).await
    }

    pub async fn get_ride(
        &self,
        caller: Option<Uuid>,
        id: Uuid,
    ) -> Result<RideDetails, DomainError> {
        let ride = load_ride(self.repo.as_ref(), &self.db, id).await?;
        let rsvp_counts = self.repo.count_rsvps(&self.db, id).await?;
        let my_rsvp = match caller {
            Some(user_id) => self
                .repo
                .find_rsvp(&self.db, id, user_id)
                .await?
                .map(|r| r.status),
            None => None,
        };
        Ok(RideDetails {
            ride,
            rsvp_counts,
            my_rsvp,
        })
    }

    /// Create a ride, or a whole series when a cadence is given. Chapter rides
    /// need chapter admin; personal rides are open to everyone.
    #[tracing::instrument(skip(self, new), fields(user.id = %caller, recurrence = new.recurrence.as_str()))]
    pub async fn create_ride(&self, caller: Uuid, new: NewRide) -> Result<CreatedRides, DomainError> {
        if let Some(chapter_id) = new.chapter_id {
            let chapter = load_chapter(self.repo.as_ref(), &self.db, chapter_id).await?;
            require_chapter_admin(self.repo.as_ref(), &self.db, &chapter, caller).await?;
        }

        let title = required_text("title", &new.title, MAX_TITLE_LENGTH)?;
        validate_metrics(new.duration_minutes, new.distance_km, new.elevation_m)?;

        let expansion = recurrence::expand(
            new.start_time,
            new.recurrence,
            new.recurrence_end_date,
            new.recurrence_count,
            self.config.max_recurrence_occurrences,
        )
        .map_err(|e| DomainError::validation("recurrence", e.to_string()))?;
        if expansion.truncated {
            tracing::warn!(
                max = self.config.max_recurrence_occurrences,
                "Recurrence rule truncated to the occurrence cap"
            );
        }

        let series_id = new.recurrence.is_recurring().then(Uuid::now_v7);
        let ts = now();
        let template = Ride {
            id: Uuid::nil(),
            chapter_id: new.chapter_id,
            created_by: caller,
            title,
            description: optional_text("description", new.description, MAX_DESCRIPTION_LENGTH)?,
            start_time: new.start_time,
            duration_minutes: new.duration_minutes,
            distance_km: new.distance_km,
            elevation_m: new.elevation_m,
            pace: optional_text("pace", new.pace, MAX_PACE_LENGTH)?,
            meeting_point: optional_text("meeting_point", new.meeting_point, MAX_TEXT_LENGTH)?,
            route_url: optional_text("route_url", new.route_url, MAX_URL_LENGTH)?,
            cancelled: false,
            recurrence: new.recurrence,
            recurrence_series_id: series_id,
            strava_event_id: None,
            sync_hash: None,
            created_at: ts,
            updated_at: ts,
        };

        let rides: Vec<Ride> = expansion
            .starts
            .into_iter()
            .map(|start| Ride {
                id: Uuid::now_v7(),
                start_time: to_utc(start),
                ..template.clone()
            })
            .collect();

        let txn = self.db.begin().await?;
        let rides = self.repo.insert_rides(&txn, rides).await?;
        txn.commit().await?;

        tracing::info!(count = rides.len(), "Created rides");
        Ok(CreatedRides {
            rides,
            truncated: expansion.truncated,
        })
    }

    /// `Series` and `Future` apply every field except `start_time`, which
    /// only moves a single ride. A ride outside any series ignores the scope.
    #[tracing::instrument(skip(self, patch), fields(user.id = %caller))]
    pub async fn update_ride(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: RidePatch,
        scope: SeriesScope,
    ) -> Result<Vec<Ride>, DomainError> {
        let ride = self.managed_ride(caller, id).await?;
        let spans_series = scope != SeriesScope::Single && ride.recurrence_series_id.is_some();
        if spans_series && patch.start_time.is_some() {
            return Err(DomainError::validation(
                "start_time",
                "start time can only be changed for a single ride",
            ));
        }
        validate_metrics(patch.duration_minutes, patch.distance_km, patch.elevation_m)?;
        if let Some(title) = patch.title.as_deref() {
            required_text("title", title, MAX_TITLE_LENGTH)?;
        }

        let targets = self.scoped_rides(ride, scope).await?;
        let ts = now();

        let txn = self.db.begin().await?;
        let mut updated = Vec::with_capacity(targets.len());
        for mut target in targets {
            apply_patch(&mut target, &patch)?;
            target.updated_at = ts;
            updated.push(self.repo.update_ride(&txn, target).await?);
        }
        txn.commit().await?;
        Ok(updated)
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn delete_ride(
        &self,
        caller: Uuid,
        id: Uuid,
        scope: SeriesScope,
    ) -> Result<u64, DomainError> {
        let ride = self.managed_ride(caller, id).await?;
        let ids: Vec<Uuid> = self
            .scoped_rides(ride, scope)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let txn = self.db.begin().await?;
        let deleted = self.repo.delete_rides(&txn, &ids).await?;
        txn.commit().await?;

        tracing::info!(deleted, "Deleted rides");
        Ok(deleted)
    }

    // ==================== RSVPs ====================

    pub async fn list_rsvps(&self, ride_id: Uuid) -> Result<Vec<Rsvp>, DomainError> {
        load_ride(self.repo.as_ref(), &self.db, ride_id).await?;
        self.repo.list_rsvps(&self.db, ride_id).await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn set_rsvp(
        &self,
        caller: Uuid,
        ride_id: Uuid,
        status: &str,
    ) -> Result<Rsvp, DomainError> {
        let ride = load_ride(self.repo.as_ref(), &self.db, ride_id).await?;
        if ride.cancelled {
            return Err(DomainError::validation(
                "ride",
                "cannot RSVP to a cancelled ride",
            ));
        }
        let status = RsvpStatus::parse(status).ok_or_else(|| {
            DomainError::validation("status", format!("unknown RSVP status '{}'", status.trim()))
        })?;

        let ts = now();
        self.repo
            .upsert_rsvp(
                &self.db,
                Rsvp {
                    id: Uuid::now_v7(),
                    ride_id,
                    user_id: caller,
                    status,
                    created_at: ts,
                    updated_at: ts,
                },
            )
            .await
    }

    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn remove_rsvp(&self, caller: Uuid, ride_id: Uuid) -> Result<(), DomainError> {
        load_ride(self.repo.as_ref(), &self.db, ride_id).await?;
        if !self.repo.delete_rsvp(&self.db, ride_id, caller).await? {
            return Err(DomainError::not_found("Rsvp", ride_id));
        }
        Ok(())
    }

    async fn managed_ride(&self, caller: Uuid, id: Uuid) -> Result<Ride, DomainError> {
        let ride = load_ride(self.repo.as_ref(), &self.db, id).await?;
        if !can_manage_ride(self.repo.as_ref(), &self.db, &ride, caller).await? {
            return Err(DomainError::forbidden(
                "only the ride creator or a chapter admin may change this ride",
            ));
        }
        Ok(ride)
    }

    /// The rides a scoped edit or delete applies to, starting from `ride`.
    async fn scoped_rides(&self, ride: Ride, scope: SeriesScope) -> Result<Vec<Ride>, DomainError> {
        let Some(series_id) = ride.recurrence_series_id else {
            return Ok(vec![ride]);
        };
        match scope {
            SeriesScope::Single => Ok(vec![ride]),
            SeriesScope::Series => self.repo.list_series(&self.db, series_id).await,
            SeriesScope::Future => Ok(self
                .repo
                .list_series(&self.db, series_id)
                .await?
                .into_iter()
                .filter(|r| r.start_time >= ride.start_time)
                .collect()),
        }
    }
}

fn to_utc(at: OffsetDateTime) -> OffsetDateTime {
    at.to_offset(UtcOffset::UTC)
}

fn validate_metrics(
    duration_minutes: Option<i32>,
    distance_km: Option<f64>,
    elevation_m: Option<i32>,
) -> Result<(), DomainError> {
    if duration_minutes.is_some_and(|d| d <= 0) {
        return Err(DomainError::validation("duration_minutes", "must be positive"));
    }
    if distance_km.is_some_and(|d| !d.is_finite() || d < 0.0) {
        return Err(DomainError::validation("distance_km", "must be a non-negative number"));
    }
    if elevation_m.is_some_and(|e| e < 0) {
        return Err(DomainError::validation("elevation_m", "must not be negative"));
    }
    Ok(())
}

fn apply_patch(ride: &mut Ride, patch: &RidePatch) -> Result<(), DomainError> {
    if let Some(title) = patch.title.as_deref() {
        ride.title = required_text("title", title, MAX_TITLE_LENGTH)?;
    }
    patch_optional(
        &mut ride.description,
        "description",
        patch.description.clone(),
        MAX_DESCRIPTION_LENGTH,
    )?;
    if let Some(start) = patch.start_time {
        ride.start_time = to_utc(start);
    }
    if let Some(d) = patch.duration_minutes {
        ride.duration_minutes = Some(d);
    }
    if let Some(d) = patch.distance_km {
        ride.distance_km = Some(d);
    }
    if let Some(e) = patch.elevation_m {
        ride.elevation_m = Some(e);
    }
    patch_optional(&mut ride.pace, "pace", patch.pace.clone(), MAX_PACE_LENGTH)?;
    patch_optional(
        &mut ride.meeting_point,
        "meeting_point",
        patch.meeting_point.clone(),
        MAX_TEXT_LENGTH,
    )?;
    patch_optional(&mut ride.route_url, "route_url", patch.route_url.clone(), MAX_URL_LENGTH)?;
    if let Some(cancelled) = patch.cancelled {
        ride.cancelled = cancelled;
    }
    Ok(())
}
