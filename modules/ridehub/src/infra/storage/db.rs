use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};

use crate::domain::error::DomainError;

/// Map a `SeaORM` error onto the domain taxonomy. Unique-index violations
/// surface as conflicts, anything else is an opaque database failure.
pub fn db_err(e: DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        tracing::debug!(%detail, "unique constraint violated");
        return DomainError::conflict("resource already exists");
    }
    tracing::error!(error = %e, "database operation failed");
    DomainError::database(e.to_string())
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        db_err(e)
    }
}

/// Open a pool for `url`. In-memory `SQLite` is pinned to a single
/// connection since every connection would otherwise see its own database.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let in_memory = url.starts_with("sqlite::memory:") || url.contains("mode=memory");
    let mut opts = ConnectOptions::new(url.to_owned());
    opts.max_connections(if in_memory { 1 } else { max_connections.max(1) })
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if in_memory {
        // Recycling the only connection would discard the database.
        let forever = Duration::from_secs(u64::from(u32::MAX));
        opts.idle_timeout(forever).max_lifetime(forever);
    }
    Database::connect(opts).await
}
