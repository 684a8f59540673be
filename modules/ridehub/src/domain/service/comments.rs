use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::access::{is_ride_chapter_admin, load_ride};
use super::{ServiceConfig, now, required_text};
use crate::domain::error::DomainError;
use crate::domain::models::Comment;
use crate::domain::repos::Repositories;

pub struct CommentsService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
    config: ServiceConfig,
}

impl<R: Repositories> CommentsService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection, config: ServiceConfig) -> Self {
        Self { repo, db, config }
    }

    pub async fn list_comments(&self, ride_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        load_ride(self.repo.as_ref(), &self.db, ride_id).await?;
        self.repo.list_comments(&self.db, ride_id).await
    }

    #[tracing::instrument(skip(self, body), fields(user.id = %caller))]
    pub async fn add_comment(
        &self,
        caller: Uuid,
        ride_id: Uuid,
        body: &str,
    ) -> Result<Comment, DomainError> {
        load_ride(self.repo.as_ref(), &self.db, ride_id).await?;
        let body = required_text("body", body, self.config.max_comment_length)?;
        let ts = now();
        self.repo
            .insert_comment(
                &self.db,
                Comment {
                    id: Uuid::now_v7(),
                    ride_id,
                    author_id: caller,
                    body,
                    created_at: ts,
                    updated_at: ts,
                },
            )
            .await
    }

    /// Authors edit their own comments only.
    #[tracing::instrument(skip(self, body), fields(user.id = %caller))]
    pub async fn edit_comment(
        &self,
        caller: Uuid,
        id: Uuid,
        body: &str,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.load(id).await?;
        if comment.author_id != caller {
            return Err(DomainError::forbidden("only the author may edit a comment"));
        }
        comment.body = required_text("body", body, self.config.max_comment_length)?;
        comment.updated_at = now();
        self.repo.update_comment(&self.db, comment).await
    }

    /// Author or an admin of the ride's chapter.
    #[tracing::instrument(skip(self), fields(user.id = %caller))]
    pub async fn delete_comment(&self, caller: Uuid, id: Uuid) -> Result<(), DomainError> {
        let comment = self.load(id).await?;
        if comment.author_id != caller {
            let ride = load_ride(self.repo.as_ref(), &self.db, comment.ride_id).await?;
            if !is_ride_chapter_admin(self.repo.as_ref(), &self.db, &ride, caller).await? {
                return Err(DomainError::forbidden(
                    "only the author or a chapter admin may delete a comment",
                ));
            }
        }
        self.repo.delete_comment(&self.db, id).await?;
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.repo
            .find_comment(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))
    }
}
