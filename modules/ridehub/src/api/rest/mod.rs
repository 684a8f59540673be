//! REST surface: axum routes, handlers and the DTOs they speak.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod problem;
pub mod response;
pub mod routes;
