use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

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
CREATE TABLE IF NOT EXISTS rides (
    id UUID PRIMARY KEY NOT NULL,
    chapter_id UUID,
    created_by UUID NOT NULL,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    start_time TIMESTAMPTZ NOT NULL,
    duration_minutes INTEGER,
    distance_km DOUBLE PRECISION,
    elevation_m INTEGER,
    pace VARCHAR(64),
    meeting_point TEXT,
    route_url TEXT,
    cancelled BOOLEAN NOT NULL DEFAULT FALSE,
    recurrence VARCHAR(16) NOT NULL DEFAULT 'NONE',
    recurrence_series_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rides_start_time ON rides(start_time);
CREATE INDEX IF NOT EXISTS idx_rides_chapter ON rides(chapter_id, start_time);
CREATE INDEX IF NOT EXISTS idx_rides_series ON rides(recurrence_series_id);

CREATE TABLE IF NOT EXISTS rsvps (
    id UUID PRIMARY KEY NOT NULL,
    ride_id UUID NOT NULL,
    user_id UUID NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_rsvps_ride_user ON rsvps(ride_id, user_id);

CREATE TABLE IF NOT EXISTS comments (
    id UUID PRIMARY KEY NOT NULL,
    ride_id UUID NOT NULL,
    author_id UUID NOT NULL,
    body TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_ride ON comments(ride_id, created_at);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS rides (
    id TEXT PRIMARY KEY NOT NULL,
    chapter_id TEXT,
    created_by TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    start_time TEXT NOT NULL,
    duration_minutes INTEGER,
    distance_km REAL,
    elevation_m INTEGER,
    pace TEXT,
    meeting_point TEXT,
    route_url TEXT,
    cancelled INTEGER NOT NULL DEFAULT 0,
    recurrence TEXT NOT NULL DEFAULT 'NONE',
    recurrence_series_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_rides_start_time ON rides(start_time);
CREATE INDEX IF NOT EXISTS idx_rides_chapter ON rides(chapter_id, start_time);
CREATE INDEX IF NOT EXISTS idx_rides_series ON rides(recurrence_series_id);

CREATE TABLE IF NOT EXISTS rsvps (
    id TEXT PRIMARY KEY NOT NULL,
    ride_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_rsvps_ride_user ON rsvps(ride_id, user_id);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY NOT NULL,
    ride_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_ride ON comments(ride_id, created_at);
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
        let conn = manager.get_connection();
        let sql = r"
DROP TABLE IF EXISTS comments;
DROP TABLE IF EXISTS rsvps;
DROP TABLE IF EXISTS rides;
        ";
        conn.execute_unprepared(sql).await?;
        Ok(())
    }
}
