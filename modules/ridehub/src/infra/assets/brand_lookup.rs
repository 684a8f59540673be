use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{BrandLookupConfig, SecretString};
use crate::domain::error::DomainError;
use crate::domain::models::BrandInfo;
use crate::domain::ports::BrandLookup;
use crate::infra::http::{build_client, ensure_success, parse_base_url, read_json, send};

const SERVICE: &str = "brands";

/// Brand metadata by domain (Brandfetch-compatible API).
pub struct BrandLookupClient {
    http: reqwest::Client,
    base: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct BrandResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    logos: Vec<BrandAsset>,
}

#[derive(Debug, Deserialize)]
struct BrandAsset {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    formats: Vec<AssetFormat>,
}

#[derive(Debug, Deserialize)]
struct AssetFormat {
    src: String,
}

impl BrandResponse {
    fn asset_url(&self, kind: &str) -> Option<String> {
        self.logos
            .iter()
            .filter(|asset| asset.kind == kind)
            .find_map(|asset| asset.formats.first())
            .map(|format| format.src.clone())
    }

    fn into_brand(self, requested: &str) -> BrandInfo {
        let logo_url = self.asset_url("logo");
        let icon_url = self.asset_url("icon").or_else(|| self.asset_url("symbol"));
        let domain = self.domain.unwrap_or_else(|| requested.to_owned());
        BrandInfo {
            name: self.name.unwrap_or_else(|| domain.clone()),
            domain,
            logo_url,
            icon_url,
        }
    }
}

impl BrandLookupClient {
    pub fn new(cfg: &BrandLookupConfig) -> anyhow::Result<Self> {
        let base = parse_base_url("brands.api_base_url", &cfg.api_base_url)?;
        Ok(Self {
            http: build_client(cfg.http_timeout_secs)?,
            base: base.as_str().trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl BrandLookup for BrandLookupClient {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, domain: &str) -> Result<Option<BrandInfo>, DomainError> {
        if self.api_key.is_empty() {
            return Err(DomainError::upstream(SERVICE, "brand lookup is not configured"));
        }

        let response = send(
            SERVICE,
            self.http
                .get(format!("{}/brands/{domain}", self.base))
                .bearer_auth(self.api_key.expose()),
        )
        .await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("No brand data for domain");
            return Ok(None);
        }

        let brand: BrandResponse = read_json(SERVICE, ensure_success(SERVICE, response).await?).await?;
        Ok(Some(brand.into_brand(domain)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> BrandLookupClient {
        BrandLookupClient::new(&BrandLookupConfig {
            api_base_url: server.url("/v2"),
            api_key: SecretString::new("key"),
            ..BrandLookupConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn maps_logo_and_icon() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v2/brands/rapha.cc")
                .header("authorization", "Bearer key");
            then.status(200).json_body(json!({
                "name": "Rapha",
                "domain": "rapha.cc",
                "logos": [
                    {"type": "icon", "formats": [{"src": "https://cdn/icon.png"}]},
                    {"type": "logo", "formats": [{"src": "https://cdn/logo.svg"}, {"src": "https://cdn/logo.png"}]}
                ]
            }));
        });

        let brand = client(&server).lookup("rapha.cc").await.unwrap().unwrap();
        assert_eq!(brand.name, "Rapha");
        assert_eq!(brand.logo_url.as_deref(), Some("https://cdn/logo.svg"));
        assert_eq!(brand.icon_url.as_deref(), Some("https://cdn/icon.png"));
    }

    #[tokio::test]
    async fn unknown_domain_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/brands/nope.example");
            then.status(404);
        });

        assert_eq!(client(&server).lookup("nope.example").await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/brands/broken.example");
            then.status(500);
        });

        let err = tokio_test::assert_err!(client(&server).lookup("broken.example").await);
        assert!(matches!(err, DomainError::Upstream { service: "brands", .. }));
    }
}
