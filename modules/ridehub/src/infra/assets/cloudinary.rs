use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CloudinaryConfig;
use crate::domain::error::DomainError;
use crate::domain::models::UploadedImage;
use crate::domain::ports::ImageUploader;
use crate::infra::http::{build_client, parse_base_url, send_json};

const SERVICE: &str = "cloudinary";

/// Unsigned uploads through a Cloudinary upload preset.
pub struct CloudinaryClient {
    http: reqwest::Client,
    endpoint: Option<String>,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl CloudinaryClient {
    pub fn new(cfg: &CloudinaryConfig) -> anyhow::Result<Self> {
        let base = parse_base_url("cloudinary.api_base_url", &cfg.api_base_url)?;
        let endpoint = (!cfg.cloud_name.trim().is_empty()).then(|| {
            format!(
                "{}/{}/image/upload",
                base.as_str().trim_end_matches('/'),
                cfg.cloud_name.trim()
            )
        });
        Ok(Self {
            http: build_client(cfg.http_timeout_secs)?,
            endpoint,
            upload_preset: cfg.upload_preset.clone(),
        })
    }
}

#[async_trait]
impl ImageUploader for CloudinaryClient {
    #[tracing::instrument(skip(self, file))]
    async fn upload(&self, file: &str, folder: Option<&str>) -> Result<UploadedImage, DomainError> {
        let Some(endpoint) = &self.endpoint else {
            return Err(DomainError::upstream(SERVICE, "image uploads are not configured"));
        };

        let mut form = vec![("file", file), ("upload_preset", self.upload_preset.as_str())];
        if let Some(folder) = folder {
            form.push(("folder", folder));
        }

        let uploaded: UploadResponse =
            send_json(SERVICE, self.http.post(endpoint).form(&form)).await?;
        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            width: uploaded.width,
            height: uploaded.height,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn upload_posts_to_cloud_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1_1/demo/image/upload");
            then.status(200).json_body(json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/rides/abc.jpg",
                "public_id": "rides/abc",
                "width": 800,
                "height": 600,
                "format": "jpg"
            }));
        });

        let client = CloudinaryClient::new(&CloudinaryConfig {
            cloud_name: "demo".to_owned(),
            upload_preset: "unsigned".to_owned(),
            api_base_url: server.url("/v1_1"),
            ..CloudinaryConfig::default()
        })
        .unwrap();

        let image = client
            .upload("https://example.com/photo.jpg", Some("rides"))
            .await
            .unwrap();
        assert_eq!(mock.calls(), 1);
        assert_eq!(image.public_id, "rides/abc");
        assert_eq!(image.width, Some(800));
    }

    #[tokio::test]
    async fn missing_cloud_name_is_an_upstream_error() {
        let client = CloudinaryClient::new(&CloudinaryConfig::default()).unwrap();
        let err = client.upload("data:image/png;base64,AAAA", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Upstream { service: "cloudinary", .. }));
    }
}
