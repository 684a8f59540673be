//! Persistence ports.
//!
//! Every method takes the connection explicitly so a service can run several
//! repository calls inside one `DatabaseTransaction`. Method names carry the
//! resource so a single storage type can implement all traits.

mod chapters_repo;
mod comments_repo;
mod communities_repo;
mod members_repo;
mod rides_repo;
mod rsvps_repo;
mod sponsors_repo;
mod strava_repo;
mod users_repo;

pub use chapters_repo::ChaptersRepository;
pub use comments_repo::CommentsRepository;
pub use communities_repo::CommunitiesRepository;
pub use members_repo::MembersRepository;
pub use rides_repo::RidesRepository;
pub use rsvps_repo::RsvpsRepository;
pub use sponsors_repo::SponsorsRepository;
pub use strava_repo::StravaConnectionsRepository;
pub use users_repo::UsersRepository;

/// Everything the services need from storage.
pub trait Repositories:
    UsersRepository
    + CommunitiesRepository
    + ChaptersRepository
    + MembersRepository
    + RidesRepository
    + RsvpsRepository
    + CommentsRepository
    + SponsorsRepository
    + StravaConnectionsRepository
    + 'static
{
}

impl<T> Repositories for T where
    T: UsersRepository
        + CommunitiesRepository
        + ChaptersRepository
        + MembersRepository
        + RidesRepository
        + RsvpsRepository
        + CommentsRepository
        + SponsorsRepository
        + StravaConnectionsRepository
        + 'static
{
}
