//! Request handlers, one submodule per resource.
//!
//! Handlers only translate between DTOs and domain calls; every rule lives
//! in `domain::service`. The authenticated [`Caller`](crate::api::rest::auth::Caller)
//! and the shared services arrive as request extensions.

use axum::Json;
use serde_json::{Value, json};

pub mod assets;
pub mod chapters;
pub mod comments;
pub mod communities;
pub mod members;
pub mod rides;
pub mod rsvps;
pub mod sponsors;
pub mod strava;
pub mod users;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
