use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Configuration for the ridehub module.
///
/// Every section has defaults so an empty `ridehub:` block is a valid config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RideHubConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_display_name_length: usize,
    pub max_comment_length: usize,
    /// Upper bound of rides generated from one recurring template.
    pub max_recurrence_occurrences: u32,
    pub auth: AuthConfig,
    pub strava: StravaConfig,
    pub cloudinary: CloudinaryConfig,
    pub brands: BrandLookupConfig,
}

impl Default for RideHubConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
            max_display_name_length: 100,
            max_comment_length: 2000,
            max_recurrence_occurrences: 52,
            auth: AuthConfig::default(),
            strava: StravaConfig::default(),
            cloudinary: CloudinaryConfig::default(),
            brands: BrandLookupConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Development mode: trust the `x-user-id` header instead of a bearer JWT.
    pub disabled: bool,
    /// HS256 secret used to verify bearer tokens.
    pub jwt_secret: SecretString,
    pub issuer: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            jwt_secret: SecretString::new(""),
            issuer: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StravaConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub scope: String,
    /// Key used to sign the OAuth `state` parameter.
    pub state_secret: SecretString,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub http_timeout_secs: u64,
    /// Interval of the background sync over all linked chapters; 0 disables it.
    pub sync_interval_secs: u64,
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::new(""),
            redirect_uri: "http://localhost:8087/api/strava/callback".to_owned(),
            scope: "read,activity:read".to_owned(),
            state_secret: SecretString::new(""),
            api_base_url: "https://www.strava.com/api/v3".to_owned(),
            oauth_base_url: "https://www.strava.com/oauth".to_owned(),
            http_timeout_secs: 15,
            sync_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub api_base_url: String,
    pub http_timeout_secs: u64,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: String::new(),
            api_base_url: "https://api.cloudinary.com/v1_1".to_owned(),
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandLookupConfig {
    pub api_base_url: String,
    pub api_key: SecretString,
    pub http_timeout_secs: u64,
}

impl Default for BrandLookupConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.brandfetch.io/v2".to_owned(),
            api_key: SecretString::new(""),
            http_timeout_secs: 10,
        }
    }
}

/// Opaque wrapper around a secret string value.
///
/// `Debug`, `Display` and `Serialize` all print `[REDACTED]`, so dumping the
/// effective configuration never leaks credentials. The buffer is zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read-only access to the underlying secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str("[REDACTED]")
        }
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_redacted_everywhere() {
        let s = SecretString::new("hunter2");
        assert_eq!(format!("{s:?}"), "[REDACTED]");
        assert_eq!(format!("{s}"), "[REDACTED]");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");
        assert_eq!(s.expose(), "hunter2");
    }

    #[test]
    fn empty_config_section_uses_defaults() {
        let cfg: RideHubConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.default_page_size, 50);
        assert_eq!(cfg.max_recurrence_occurrences, 52);
        assert!(!cfg.auth.disabled);
        assert_eq!(cfg.strava.api_base_url, "https://www.strava.com/api/v3");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<RideHubConfig, _> = serde_json::from_str(r#"{"bogus": 1}"#);
        assert!(res.is_err());
    }
}
