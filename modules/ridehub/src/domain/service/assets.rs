use std::sync::Arc;

use url::Url;

use crate::domain::error::DomainError;
use crate::domain::models::{BrandInfo, UploadedImage};
use crate::domain::ports::{BrandLookup, ImageUploader};

const MAX_FOLDER_LENGTH: usize = 64;

/// Image uploads and brand lookups, both delegated to third parties.
pub struct AssetsService {
    images: Arc<dyn ImageUploader>,
    brands: Arc<dyn BrandLookup>,
}

impl AssetsService {
    pub fn new(images: Arc<dyn ImageUploader>, brands: Arc<dyn BrandLookup>) -> Self {
        Self { images, brands }
    }

    #[tracing::instrument(skip(self, file))]
    pub async fn upload_image(
        &self,
        file: &str,
        folder: Option<&str>,
    ) -> Result<UploadedImage, DomainError> {
        let file = file.trim();
        if file.is_empty() {
            return Err(DomainError::validation("file", "must not be empty"));
        }
        if !(file.starts_with("data:image/")
            || file.starts_with("https://")
            || file.starts_with("http://"))
        {
            return Err(DomainError::validation(
                "file",
                "must be an image data URI or an http(s) URL",
            ));
        }
        let folder = folder.map(str::trim).filter(|f| !f.is_empty());
        if let Some(folder) = folder {
            let valid = folder.len() <= MAX_FOLDER_LENGTH
                && folder
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'));
            if !valid {
                return Err(DomainError::validation(
                    "folder",
                    "only letters, digits, '-', '_' and '/' are allowed",
                ));
            }
        }
        self.images.upload(file, folder).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn lookup_brand(&self, domain: &str) -> Result<BrandInfo, DomainError> {
        let domain = normalize_domain(domain)?;
        self.brands
            .lookup(&domain)
            .await?
            .ok_or_else(|| DomainError::not_found_key("Brand", domain))
    }
}

/// Bare lower-case host: scheme, `www.`, port and path removed.
pub fn normalize_domain(raw: &str) -> Result<String, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("domain", "must not be empty"));
    }
    let with_scheme = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    let host = Url::parse(&with_scheme)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .ok_or_else(|| DomainError::validation("domain", format!("'{raw}' is not a domain")))?;
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return Err(DomainError::validation("domain", format!("'{raw}' is not a domain")));
    }
    Ok(host.to_owned())
}

#[cfg(test)]
mod tests {
    use super::normalize_domain;

    #[test]
    fn domain_normalization() {
        let ok = |s: &str| normalize_domain(s).ok();
        assert_eq!(ok("rapha.cc").as_deref(), Some("rapha.cc"));
        assert_eq!(ok("https://www.Rapha.cc/en/shop?x=1").as_deref(), Some("rapha.cc"));
        assert_eq!(ok("http://shop.example.com:8080").as_deref(), Some("shop.example.com"));
        assert_eq!(ok("www.canyon.com/").as_deref(), Some("canyon.com"));
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("localhost").is_err());
        assert!(normalize_domain("not a domain").is_err());
    }
}
