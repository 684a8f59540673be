use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use super::SeaRepository;
use crate::domain::error::DomainError;
use crate::domain::models::StravaConnection;
use crate::domain::repos::StravaConnectionsRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::strava_connection::{
    ActiveModel as ConnectionAM, Entity as ConnectionEntity,
};

#[async_trait]
impl StravaConnectionsRepository for SeaRepository {
    async fn find_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<StravaConnection>, DomainError> {
        let found = ConnectionEntity::find_by_id(user_id)
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn upsert_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        connection: StravaConnection,
    ) -> Result<StravaConnection, DomainError> {
        let exists = ConnectionEntity::find_by_id(connection.user_id)
            .one(conn)
            .await
            .map_err(db_err)?
            .is_some();

        let am = ConnectionAM {
            user_id: Set(connection.user_id),
            athlete_id: Set(connection.athlete_id),
            access_token: Set(connection.access_token.clone()),
            refresh_token: Set(connection.refresh_token.clone()),
            expires_at: Set(connection.expires_at),
            scope: Set(connection.scope.clone()),
            updated_at: Set(connection.updated_at),
        };
        let saved = if exists {
            am.update(conn).await.map_err(db_err)?
        } else {
            am.insert(conn).await.map_err(db_err)?
        };
        Ok(saved.into())
    }

    async fn delete_strava_connection<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = ConnectionEntity::delete_by_id(user_id)
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
