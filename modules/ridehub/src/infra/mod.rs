pub mod assets;
mod http;
pub mod storage;
pub mod strava;
