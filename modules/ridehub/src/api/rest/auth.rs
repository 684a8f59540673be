//! Caller authentication.
//!
//! Protected routes require `Authorization: Bearer <jwt>` signed with the
//! configured HS256 secret; the `sub` claim is the caller's user id. With
//! `auth.disabled` the caller is taken from the `x-user-id` header instead.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::error::domain_error_to_problem;
use crate::config::AuthConfig;
use crate::domain::error::DomainError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, inserted into request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

enum Mode {
    Header,
    Jwt {
        key: DecodingKey,
        validation: Box<Validation>,
    },
}

#[derive(Clone)]
pub struct AuthState {
    mode: Arc<Mode>,
}

impl AuthState {
    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let mode = if cfg.disabled {
            tracing::warn!("Authentication disabled: trusting the {USER_ID_HEADER} header");
            Mode::Header
        } else {
            if cfg.jwt_secret.is_empty() {
                anyhow::bail!("ridehub.auth.jwt_secret must be set unless auth.disabled is true");
            }
            let mut validation = Validation::new(Algorithm::HS256);
            if let Some(issuer) = &cfg.issuer {
                validation.set_issuer(&[issuer]);
            }
            Mode::Jwt {
                key: DecodingKey::from_secret(cfg.jwt_secret.expose().as_bytes()),
                validation: Box::new(validation),
            }
        };
        Ok(Self {
            mode: Arc::new(mode),
        })
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Caller, DomainError> {
        let user_id = match self.mode.as_ref() {
            Mode::Header => headers
                .get(USER_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| Uuid::parse_str(v.trim()).ok()),
            Mode::Jwt { key, validation } => extract_bearer_token(headers).and_then(|token| {
                decode::<Claims>(token, key, validation)
                    .map_err(|e| tracing::debug!(error = %e, "Rejected bearer token"))
                    .ok()
                    .and_then(|data| Uuid::parse_str(&data.claims.sub).ok())
            }),
        };
        user_id
            .map(|user_id| Caller { user_id })
            .ok_or(DomainError::Unauthorized)
    }
}

/// Reject unauthenticated requests with 401, otherwise attach [`Caller`].
pub async fn require_caller(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match auth.authenticate(request.headers()) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => domain_error_to_problem(&e, request.uri().path()).into_response(),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SecretString;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use tracing_test::traced_test;

    fn jwt_config() -> AuthConfig {
        AuthConfig {
            disabled: false,
            jwt_secret: SecretString::new("test-secret"),
            issuer: None,
        }
    }

    fn token(secret: &str, sub: &str, exp: u64) -> String {
        let claims = Claims {
            sub: sub.to_owned(),
            exp,
            iss: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn valid_jwt_yields_caller() {
        let auth = AuthState::from_config(&jwt_config()).unwrap();
        let user = Uuid::now_v7();
        let headers = bearer(&token("test-secret", &user.to_string(), 4_000_000_000));
        assert_eq!(auth.authenticate(&headers).unwrap().user_id, user);
    }

    #[test]
    fn wrong_secret_expired_or_missing_is_unauthorized() {
        let auth = AuthState::from_config(&jwt_config()).unwrap();
        let user = Uuid::now_v7().to_string();

        let forged = bearer(&token("other", &user, 4_000_000_000));
        assert!(matches!(auth.authenticate(&forged), Err(DomainError::Unauthorized)));

        let expired = bearer(&token("test-secret", &user, 1_000));
        assert!(matches!(auth.authenticate(&expired), Err(DomainError::Unauthorized)));

        assert!(auth.authenticate(&HeaderMap::new()).is_err());
    }

    #[test]
    fn header_mode_reads_user_id() {
        let auth = AuthState::from_config(&AuthConfig {
            disabled: true,
            ..AuthConfig::default()
        })
        .unwrap();
        let user = Uuid::now_v7();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&user.to_string()).unwrap());
        assert_eq!(auth.authenticate(&headers).unwrap().user_id, user);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(auth.authenticate(&headers).is_err());
    }

    #[test]
    #[traced_test]
    fn disabled_auth_is_announced() {
        let auth = AuthState::from_config(&AuthConfig {
            disabled: true,
            ..AuthConfig::default()
        });
        assert!(auth.is_ok());
        assert!(logs_contain("Authentication disabled"));
    }

    #[test]
    fn jwt_mode_requires_secret() {
        assert!(AuthState::from_config(&AuthConfig::default()).is_err());
    }
}
