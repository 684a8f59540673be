//! RideHub: group rides for cycling communities.
//!
//! Users, communities with city chapters, rides (optionally recurring) with
//! RSVPs and comments, chapter sponsors and a Strava club-event sync, served
//! as a JSON REST API over a `SeaORM` store.
//!
//! Layout follows the usual split:
//! - `api::rest` - axum routes, handlers, DTOs, problem responses
//! - `domain` - models, rules, repository ports and services
//! - `infra` - `SeaORM` storage and outbound HTTP clients
//! - `module` - composition root wiring it all together

pub mod module;
pub use module::{DatabaseSettings, RideHub, Services};

pub mod config;
pub use config::RideHubConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
