//! REST route table.
//!
//! - `/health` and the Strava OAuth callback are public
//! - everything else under `/api` requires an authenticated caller
//!
//! Services reach handlers through an `Extension` layer.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::api::rest::auth::{AuthState, require_caller};
use crate::api::rest::handlers::{
    assets, chapters, comments, communities, health, members, rides, rsvps, sponsors, strava,
    users,
};
use crate::module::Services;

pub fn register_routes(router: Router, services: Arc<Services>, auth: AuthState) -> Router {
    let protected = Router::new()
        // Users
        .route("/api/me", get(users::get_me).put(users::upsert_me))
        .route("/api/users", get(users::search_users))
        .route("/api/users/{id}", get(users::get_user))
        // Communities
        .route(
            "/api/communities",
            get(communities::list_communities).post(communities::create_community),
        )
        .route(
            "/api/communities/{id}",
            get(communities::get_community)
                .patch(communities::update_community)
                .delete(communities::delete_community),
        )
        .route(
            "/api/communities/{id}/chapters",
            get(chapters::list_chapters).post(chapters::create_chapter),
        )
        // Chapters & memberships
        .route(
            "/api/chapters/{id}",
            get(chapters::get_chapter)
                .patch(chapters::update_chapter)
                .delete(chapters::delete_chapter),
        )
        .route(
            "/api/chapters/{id}/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/api/chapters/{id}/members/{user_id}",
            axum::routing::patch(members::change_role).delete(members::remove_member),
        )
        .route("/api/chapters/{id}/join", post(members::join))
        .route("/api/chapters/{id}/leave", post(members::leave))
        .route(
            "/api/chapters/{id}/sponsors",
            get(sponsors::list_sponsors).post(sponsors::add_sponsor),
        )
        .route(
            "/api/chapters/{id}/strava",
            put(strava::link_club).delete(strava::unlink_club),
        )
        .route("/api/chapters/{id}/strava/sync", post(strava::sync_chapter))
        // Sponsors
        .route(
            "/api/sponsors/{id}",
            axum::routing::patch(sponsors::update_sponsor).delete(sponsors::delete_sponsor),
        )
        // Rides, RSVPs, comments
        .route("/api/rides", get(rides::list_rides).post(rides::create_ride))
        .route(
            "/api/rides/{id}",
            get(rides::get_ride)
                .patch(rides::update_ride)
                .delete(rides::delete_ride),
        )
        .route("/api/rides/{id}/rsvps", get(rsvps::list_rsvps))
        .route(
            "/api/rides/{id}/rsvp",
            put(rsvps::set_rsvp).delete(rsvps::remove_rsvp),
        )
        .route(
            "/api/rides/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/api/comments/{id}",
            axum::routing::patch(comments::edit_comment).delete(comments::delete_comment),
        )
        // Strava account
        .route("/api/strava/connect", get(strava::connect))
        .route(
            "/api/strava/connection",
            get(strava::get_connection).delete(strava::disconnect),
        )
        .route("/api/strava/clubs", get(strava::clubs))
        // Third-party assets
        .route("/api/uploads/images", post(assets::upload_image))
        .route("/api/brands/lookup", get(assets::lookup_brand))
        .route_layer(middleware::from_fn_with_state(auth, require_caller));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/strava/callback", get(strava::callback));

    router
        .merge(public)
        .merge(protected)
        .layer(axum::Extension(services))
}
