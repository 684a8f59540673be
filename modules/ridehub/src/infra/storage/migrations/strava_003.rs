use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Strava grants, club links on chapters and sync bookkeeping on rides.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
CREATE TABLE IF NOT EXISTS strava_connections (
    user_id UUID PRIMARY KEY NOT NULL,
    athlete_id BIGINT NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    scope VARCHAR(255),
    updated_at TIMESTAMPTZ NOT NULL
);

ALTER TABLE chapters ADD COLUMN IF NOT EXISTS strava_club_id BIGINT;
ALTER TABLE chapters ADD COLUMN IF NOT EXISTS strava_linked_by UUID;

ALTER TABLE rides ADD COLUMN IF NOT EXISTS strava_event_id BIGINT;
ALTER TABLE rides ADD COLUMN IF NOT EXISTS sync_hash VARCHAR(64);
CREATE UNIQUE INDEX IF NOT EXISTS idx_rides_strava_event ON rides(strava_event_id);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS strava_connections (
    user_id TEXT PRIMARY KEY NOT NULL,
    athlete_id INTEGER NOT NULL,
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    scope TEXT,
    updated_at TEXT NOT NULL
);

ALTER TABLE chapters ADD COLUMN strava_club_id INTEGER;
ALTER TABLE chapters ADD COLUMN strava_linked_by TEXT;

ALTER TABLE rides ADD COLUMN strava_event_id INTEGER;
ALTER TABLE rides ADD COLUMN sync_hash TEXT;
CREATE UNIQUE INDEX IF NOT EXISTS idx_rides_strava_event ON rides(strava_event_id);
                "
            }
            sea_orm::DatabaseBackend::MySql => {
                return Err(DbErr::Migration("MySQL is not supported".to_owned()));
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
DROP INDEX IF EXISTS idx_rides_strava_event;
ALTER TABLE rides DROP COLUMN IF EXISTS sync_hash;
ALTER TABLE rides DROP COLUMN IF EXISTS strava_event_id;
ALTER TABLE chapters DROP COLUMN IF EXISTS strava_linked_by;
ALTER TABLE chapters DROP COLUMN IF EXISTS strava_club_id;
DROP TABLE IF EXISTS strava_connections;
                "
            }
            _ => {
                r"
DROP INDEX IF EXISTS idx_rides_strava_event;
ALTER TABLE rides DROP COLUMN sync_hash;
ALTER TABLE rides DROP COLUMN strava_event_id;
ALTER TABLE chapters DROP COLUMN strava_linked_by;
ALTER TABLE chapters DROP COLUMN strava_club_id;
DROP TABLE IF EXISTS strava_connections;
                "
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }
}
