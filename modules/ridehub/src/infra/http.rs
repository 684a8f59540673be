//! Shared plumbing for the outbound HTTP clients.

use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{Instrument, info_span};

use crate::domain::error::DomainError;

pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .pool_max_idle_per_host(4)
        .build()
        .context("failed to build HTTP client")
}

pub(crate) fn parse_base_url(name: &str, raw: &str) -> anyhow::Result<url::Url> {
    url::Url::parse(raw.trim_end_matches('/')).with_context(|| format!("invalid {name}: {raw}"))
}

/// Send the request and hand back the response whatever its status.
pub(crate) async fn send(service: &'static str, builder: RequestBuilder) -> Result<Response, DomainError> {
    builder
        .send()
        .instrument(info_span!("http_request", service))
        .await
        .map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_owned()
            } else if e.is_connect() {
                format!("connection error: {e}")
            } else {
                format!("request error: {e}")
            };
            tracing::error!(service, error = %e, "Outbound request failed");
            DomainError::upstream(service, message)
        })
}

/// Fail on a non-2xx status, keeping a short excerpt of the body.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    tracing::error!(service, status = status.as_u16(), body = %excerpt, "Upstream returned an error status");
    Err(DomainError::upstream(
        service,
        format!("{service} responded with {status}"),
    ))
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, DomainError> {
    response.json::<T>().await.map_err(|e| {
        tracing::error!(service, error = %e, "Malformed upstream response");
        DomainError::upstream(service, format!("malformed response: {e}"))
    })
}

/// `send` + `ensure_success` + `read_json`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    builder: RequestBuilder,
) -> Result<T, DomainError> {
    let response = ensure_success(service, send(service, builder).await?).await?;
    read_json(service, response).await
}
