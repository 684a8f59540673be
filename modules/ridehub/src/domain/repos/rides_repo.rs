use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Page, Ride, RideFilter};

#[async_trait]
pub trait RidesRepository: Send + Sync {
    async fn find_ride<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<Ride>, DomainError>;

    /// Ordered by start time ascending.
    async fn list_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &RideFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Page<Ride>, DomainError>;

    /// Every ride of a recurrence series ordered by start time.
    async fn list_series<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        series_id: Uuid,
    ) -> Result<Vec<Ride>, DomainError>;

    async fn find_ride_by_strava_event<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        strava_event_id: i64,
    ) -> Result<Option<Ride>, DomainError>;

    async fn list_chapter_ride_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        chapter_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError>;

    async fn insert_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rides: Vec<Ride>,
    ) -> Result<Vec<Ride>, DomainError>;

    async fn update_ride<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride: Ride,
    ) -> Result<Ride, DomainError>;

    /// Deletes the rides together with their RSVPs and comments.
    async fn delete_rides<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<u64, DomainError>;
}
