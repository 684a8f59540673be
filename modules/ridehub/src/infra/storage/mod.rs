//! Infrastructure storage layer: all `SeaORM` code lives here.
//!
//! - `entity/` - table definitions
//! - `mapper.rs` - model conversions between entities and domain types
//! - `migrations/` - schema migrations, raw SQL per backend
//! - `*_sea_repo.rs` - one repository trait implementation per resource
//!
//! Every repository trait is implemented on the same stateless
//! [`SeaRepository`]; the connection (pool or open transaction) is passed
//! per call by the domain services.

use sea_orm::sea_query::LikeExpr;

pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;

mod chapters_sea_repo;
mod comments_sea_repo;
mod communities_sea_repo;
mod members_sea_repo;
mod rides_sea_repo;
mod rsvps_sea_repo;
mod sponsors_sea_repo;
mod strava_sea_repo;
mod users_sea_repo;

/// `SeaORM` implementation of every repository trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaRepository;

/// `%needle%` pattern for a lower-cased `LIKE`, with wildcards in the input escaped.
pub(crate) fn like_pattern(needle: &str) -> LikeExpr {
    let escaped = needle
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}
