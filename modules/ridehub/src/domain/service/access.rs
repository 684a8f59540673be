//! Lookups and role checks shared by the services.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::models::{Chapter, Ride};
use crate::domain::permissions::{Role, is_admin};
use crate::domain::repos::Repositories;

pub(super) async fn load_chapter<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    chapter_id: Uuid,
) -> Result<Chapter, DomainError> {
    repo.find_chapter(conn, chapter_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Chapter", chapter_id))
}

pub(super) async fn load_ride<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    ride_id: Uuid,
) -> Result<Ride, DomainError> {
    repo.find_ride(conn, ride_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Ride", ride_id))
}

/// The caller's role in a chapter. Owners of the parent community act as
/// chapter owners.
pub(super) async fn effective_role<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    chapter: &Chapter,
    user_id: Uuid,
) -> Result<Option<Role>, DomainError> {
    let community = repo.find_community(conn, chapter.community_id).await?;
    if community.is_some_and(|c| c.owner_id == user_id) {
        return Ok(Some(Role::Owner));
    }
    Ok(repo
        .find_member(conn, chapter.id, user_id)
        .await?
        .map(|m| m.role))
}

pub(super) async fn require_chapter_admin<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    chapter: &Chapter,
    user_id: Uuid,
) -> Result<Role, DomainError> {
    match effective_role(repo, conn, chapter, user_id).await? {
        Some(role) if is_admin(Some(role)) => Ok(role),
        _ => Err(DomainError::forbidden("chapter admin role required")),
    }
}

/// Creator of the ride, or an admin of its chapter.
pub(super) async fn can_manage_ride<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    ride: &Ride,
    user_id: Uuid,
) -> Result<bool, DomainError> {
    if ride.created_by == user_id {
        return Ok(true);
    }
    is_ride_chapter_admin(repo, conn, ride, user_id).await
}

/// Admin of the chapter the ride belongs to. Personal rides have no admins.
pub(super) async fn is_ride_chapter_admin<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    ride: &Ride,
    user_id: Uuid,
) -> Result<bool, DomainError> {
    let Some(chapter_id) = ride.chapter_id else {
        return Ok(false);
    };
    let Some(chapter) = repo.find_chapter(conn, chapter_id).await? else {
        return Ok(false);
    };
    Ok(is_admin(effective_role(repo, conn, &chapter, user_id).await?))
}

/// Remove a chapter with its members, sponsors, rides, RSVPs and comments.
/// Callers run this inside a transaction.
pub(super) async fn delete_chapter_cascade<R: Repositories, C: ConnectionTrait + Send + Sync>(
    repo: &R,
    conn: &C,
    chapter_id: Uuid,
) -> Result<(), DomainError> {
    let ride_ids = repo.list_chapter_ride_ids(conn, chapter_id).await?;
    let rides = repo.delete_rides(conn, &ride_ids).await?;
    let sponsors = repo.delete_chapter_sponsors(conn, chapter_id).await?;
    let members = repo.delete_chapter_members(conn, chapter_id).await?;
    repo.delete_chapter(conn, chapter_id).await?;
    tracing::debug!(%chapter_id, rides, sponsors, members, "chapter removed with dependents");
    Ok(())
}
