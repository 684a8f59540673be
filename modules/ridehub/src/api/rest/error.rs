use axum::http::StatusCode;

use crate::api::rest::problem::Problem;
use crate::domain::error::DomainError;

/// Map a domain error to its problem response.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        DomainError::NotFound { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", e.to_string()).with_code("NOT_FOUND")
        }
        DomainError::Unauthorized => {
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", e.to_string())
                .with_code("UNAUTHORIZED")
        }
        DomainError::Forbidden { .. } => {
            Problem::new(StatusCode::FORBIDDEN, "Forbidden", e.to_string()).with_code("FORBIDDEN")
        }
        DomainError::Validation { .. } => Problem::bad_request(e.to_string()),
        DomainError::Conflict { .. } => {
            Problem::new(StatusCode::CONFLICT, "Conflict", e.to_string()).with_code("CONFLICT")
        }
        DomainError::Upstream { .. } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Bad Gateway", e.to_string())
                .with_code("UPSTREAM")
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal database error occurred",
            )
            .with_code("DATABASE")
        }
    };

    let problem = problem.with_instance(instance);
    match trace_id {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::not_found("Ride", Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::validation("role", "unknown"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (DomainError::upstream("strava", "down"), StatusCode::BAD_GATEWAY),
            (DomainError::database("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(Problem::from(err).status, status);
        }
    }

    #[test]
    fn database_detail_is_hidden() {
        let p = Problem::from(DomainError::database("relation \"rides\" does not exist"));
        assert!(!p.detail.contains("rides"));
        assert!(!p.error.contains("rides"));
    }
}
