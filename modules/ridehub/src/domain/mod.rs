pub mod error;
pub mod models;
pub mod permissions;
pub mod ports;
pub mod recurrence;
pub mod repos;
pub mod service;
pub mod sync;
