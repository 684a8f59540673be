use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Rsvp, RsvpCounts};

#[async_trait]
pub trait RsvpsRepository: Send + Sync {
    async fn find_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Rsvp>, DomainError>;

    async fn list_rsvps<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<Vec<Rsvp>, DomainError>;

    async fn count_rsvps<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
    ) -> Result<RsvpCounts, DomainError>;

    /// Insert, or overwrite the status of the existing (ride, user) row.
    async fn upsert_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rsvp: Rsvp,
    ) -> Result<Rsvp, DomainError>;

    async fn delete_rsvp<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ride_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DomainError>;
}
