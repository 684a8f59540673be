use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{ServiceConfig, now, patch_optional, required_text};
use crate::domain::error::DomainError;
use crate::domain::models::{Page, PageRequest, ProfileUpdate, User};
use crate::domain::repos::Repositories;

const MAX_EMAIL_LENGTH: usize = 255;
const MAX_BIO_LENGTH: usize = 1000;
const MAX_URL_LENGTH: usize = 2048;
const MAX_LOCATION_LENGTH: usize = 255;

/// Profiles of the people using the service.
pub struct UsersService<R: Repositories> {
    repo: Arc<R>,
    db: DatabaseConnection,
    config: ServiceConfig,
}

impl<R: Repositories> UsersService<R> {
    pub fn new(repo: Arc<R>, db: DatabaseConnection, config: ServiceConfig) -> Self {
        Self { repo, db, config }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_user(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn search_users(
        &self,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let (limit, offset) = self.config.limit_cfg().resolve(page);
        self.repo.search_users(&self.db, query, limit, offset).await
    }

    /// Create the caller's profile on first write, update it afterwards.
    #[tracing::instrument(skip(self, update), fields(user.id = %caller))]
    pub async fn upsert_profile(
        &self,
        caller: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, DomainError> {
        let existing = self.repo.find_user(&self.db, caller).await?;

        let email = match (update.email.as_deref(), &existing) {
            (Some(raw), _) => Some(validate_email(raw)?),
            (None, Some(_)) => None,
            (None, None) => {
                return Err(DomainError::validation(
                    "email",
                    "email is required when creating a profile",
                ));
            }
        };
        if let Some(email) = &email {
            self.ensure_email_free(email, caller).await?;
        }

        let display_name = update
            .display_name
            .as_deref()
            .map(|name| required_text("display_name", name, self.config.max_display_name_length))
            .transpose()?;

        let ts = now();
        let mut user = existing.clone().unwrap_or_else(|| User {
            id: caller,
            email: String::new(),
            display_name: String::new(),
            bio: None,
            avatar_url: None,
            location: None,
            created_at: ts,
            updated_at: ts,
        });

        if let Some(email) = email {
            user.email = email;
        }
        if let Some(name) = display_name {
            user.display_name = name;
        } else if user.display_name.is_empty() {
            // First write without a name: fall back to the email local part.
            user.display_name = user
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .chars()
                .take(self.config.max_display_name_length)
                .collect();
        }
        patch_optional(&mut user.bio, "bio", update.bio, MAX_BIO_LENGTH)?;
        patch_optional(&mut user.avatar_url, "avatar_url", update.avatar_url, MAX_URL_LENGTH)?;
        patch_optional(&mut user.location, "location", update.location, MAX_LOCATION_LENGTH)?;
        user.updated_at = ts;

        if existing.is_some() {
            tracing::info!("Updating profile");
            self.repo.update_user(&self.db, user).await
        } else {
            tracing::info!("Creating profile");
            self.repo.insert_user(&self.db, user).await
        }
    }

    async fn ensure_email_free(&self, email: &str, owner: Uuid) -> Result<(), DomainError> {
        match self.repo.find_user_by_email(&self.db, email).await? {
            Some(other) if other.id != owner => Err(DomainError::conflict(format!(
                "email '{email}' is already registered"
            ))),
            _ => Ok(()),
        }
    }
}

/// Normalized (trimmed, lower-cased) address with non-empty local and domain parts.
pub(crate) fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(DomainError::validation(
            "email",
            format!("must be at most {MAX_EMAIL_LENGTH} characters"),
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation("email", "invalid email address"));
    }
    Ok(email)
}
