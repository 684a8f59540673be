//! Strava OAuth2 and REST client.

mod client;
mod wire;

pub use client::StravaHttpClient;
