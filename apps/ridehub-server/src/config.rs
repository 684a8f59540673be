//! Layered server configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file given with
//! `--config`, `RIDEHUB__*` environment variables (`__` separates nesting
//! levels, e.g. `RIDEHUB__SERVER__PORT`), then command-line overrides.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use ridehub::RideHubConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "RIDEHUB__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub ridehub: RideHubConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
    /// Empty disables CORS; `"*"` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_owned(),
            port: 8087,
            request_timeout_secs: 30,
            body_limit_bytes: 16 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite://…` or `postgres://…`
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://ridehub.db?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Command-line values that override the loaded configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Load defaults, then the optional YAML file, then the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(
                path.is_file(),
                "config file does not exist: {}",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .context("failed to load configuration (yaml/env)")
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            "sqlite::memory:".clone_into(&mut self.database.url);
            self.database.max_connections = 1;
        }
    }

    /// Socket the HTTP server binds to.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server.bind_addr))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Checks that need the whole config; run by both `check` and `run`.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.socket_addr()?;
        anyhow::ensure!(!self.database.url.trim().is_empty(), "database.url must be set");
        anyhow::ensure!(
            self.server.request_timeout_secs > 0,
            "server.request_timeout_secs must be positive"
        );
        anyhow::ensure!(
            self.ridehub.auth.disabled || !self.ridehub.auth.jwt_secret.is_empty(),
            "ridehub.auth.jwt_secret must be set unless ridehub.auth.disabled is true"
        );
        Ok(())
    }

    /// YAML rendering with secrets redacted.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let cfg = temp_env::with_vars_unset(["RIDEHUB__SERVER__PORT"], || {
            AppConfig::load(None).unwrap()
        });
        assert_eq!(cfg.server.port, 8087);
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert_eq!(cfg.ridehub.default_page_size, 50);
    }

    #[test]
    fn yaml_then_env_then_cli() {
        let file = yaml_file(
            r"
server:
  port: 9000
logging:
  format: json
ridehub:
  auth:
    disabled: true
",
        );

        let mut cfg = temp_env::with_var("RIDEHUB__SERVER__PORT", Some("9100"), || {
            AppConfig::load(Some(file.path())).unwrap()
        });
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(cfg.ridehub.auth.disabled);

        cfg.apply_cli_overrides(CliOverrides {
            port: Some(9200),
            verbose: 2,
            mock: true,
        });
        assert_eq!(cfg.server.port, 9200);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/ridehub.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml_file("server:\n  prot: 1\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn validation_catches_bad_address_and_missing_secret() {
        let mut cfg = AppConfig::default();
        assert!(cfg.validate().is_err(), "jwt secret is required by default");

        cfg.ridehub.auth.disabled = true;
        cfg.validate().unwrap();

        "not-an-ip".clone_into(&mut cfg.server.bind_addr);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn yaml_dump_redacts_secrets() {
        let mut cfg = AppConfig::default();
        cfg.ridehub.auth.jwt_secret = ridehub::config::SecretString::new("hunter2");
        let yaml = cfg.to_yaml().unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(yaml.contains("port: 8087"));
    }
}
