pub mod chapter;
pub mod chapter_member;
pub mod comment;
pub mod community;
pub mod ride;
pub mod rsvp;
pub mod sponsor;
pub mod strava_connection;
pub mod user;
