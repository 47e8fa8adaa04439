//! Configuration management.
//!
//! Values come from an optional config file layered under `HYDRA__`-prefixed
//! environment variables (`HYDRA__AUTH__JWT_SECRET`, `HYDRA__SERVICE__NAME`).

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Token validation configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Identity of the service this process runs as
    #[serde(default)]
    pub service: ServiceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret. Required; there is no built-in fallback.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// JWT algorithm name (HS256, HS384, HS512)
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,

    /// Leeway for expiration checks (in seconds)
    #[serde(default)]
    pub leeway_secs: u64,

    /// Expected issuer, if tokens carry one
    #[serde(default)]
    pub issuer: Option<String>,

    /// Expected audience, if tokens carry one
    #[serde(default)]
    pub audience: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: default_jwt_algorithm(),
            leeway_secs: 0,
            issuer: None,
            audience: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// Name this service is licensed under (`iam`, `aiwm`, `cbm`, `noti`).
    /// Unset makes every license-gated endpoint deny.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// OpenTelemetry OTLP endpoint
    pub otlp_endpoint: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Whether the Prometheus recorder is installed
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_jwt_algorithm() -> String { "HS256".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_enabled() -> bool { true }

impl Config {
    /// Load configuration from environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HYDRA").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with environment overrides on top.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HYDRA").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.auth.jwt_algorithm, "HS256");
        assert_eq!(cfg.auth.leeway_secs, 0);
        assert!(cfg.service.name.is_none());
        assert!(cfg.metrics.enabled);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[auth]
jwt_secret = "file-secret"
leeway_secs = 5

[service]
name = "aiwm"
"#
        )
        .unwrap();

        let cfg = Config::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("file-secret"));
        assert_eq!(cfg.auth.leeway_secs, 5);
        assert_eq!(cfg.service.name.as_deref(), Some("aiwm"));
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: Some("hunter2".to_string()),
            ..AuthConfig::default()
        };
        assert!(!format!("{:?}", auth).contains("hunter2"));
    }
}
