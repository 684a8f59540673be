use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::StravaConnection;

/// Stored OAuth grants, one per user.
#[async_trait]
pub trait StravaConnectionsRepository: Send + Sync {
    async fn find_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<StravaConnection>, DomainError>;

    async fn upsert_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        connection: StravaConnection,
    ) -> Result<StravaConnection, DomainError>;

    async fn delete_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<bool, DomainError>;
}
