//! CLI configuration.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use route66_observability::LogConfig;
use serde::{Deserialize, Serialize};

/// Config file names looked up from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["route66.toml", ".route66.toml", "route66.json"];

/// Environment variable holding the webhook HMAC secret.
pub const WEBHOOK_SECRET_ENV: &str = "ROUTE66_WEBHOOK_SECRET";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Local cart persistence.
    #[serde(default)]
    pub cart: CartConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LogConfig,

    /// Analytics settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Check values that deserialise fine but cannot work.
    ///
    /// Returns `(errors, warnings)`.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.catalog.path.trim().is_empty() {
            errors.push("catalog.path is required".to_string());
        }

        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.bind_addr '{}' is not a socket address",
                self.server.bind_addr
            ));
        }

        if self.server.transaction_log.trim().is_empty() {
            errors.push("server.transaction_log is required".to_string());
        }

        if let Some(url) = &self.server.public_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(format!(
                    "server.public_base_url '{}' must start with http:// or https://",
                    url
                ));
            } else if url.starts_with("http://") {
                warnings.push(
                    "server.public_base_url is not https; consent cookies will not be Secure"
                        .to_string(),
                );
            }
        }

        if let Some(directives) = &self.logging.directives {
            if let Err(e) = self.logging.configured_filter() {
                errors.push(format!("logging.directives '{}': {}", directives, e));
            }
        }

        match self.analytics.measurement_id.as_deref() {
            Some(id) if !id.starts_with("G-") => warnings.push(format!(
                "analytics.measurement_id '{}' does not look like a G- measurement id",
                id
            )),
            _ => {}
        }

        (errors, warnings)
    }
}

/// Catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the product JSON file, relative to the working directory.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "data/products.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// JSON file confirmed orders are appended to.
    #[serde(default = "default_transaction_log")]
    pub transaction_log: String,

    /// Public URL of the site; `https` marks cookies `Secure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_transaction_log() -> String {
    "data/transactions.json".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            transaction_log: default_transaction_log(),
            public_base_url: None,
        }
    }
}

/// Local cart persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Directory the cart snapshot is stored in.
    #[serde(default = "default_cart_dir")]
    pub store_dir: String,
}

fn default_cart_dir() -> String {
    ".route66/storage".to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            store_dir: default_cart_dir(),
        }
    }
}

/// Analytics settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Google Analytics measurement id, loaded only after consent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

/// Generate a default route66.toml config file.
pub fn generate_default_config() -> String {
    r#"# Route 66 storefront configuration

[catalog]
path = "data/products.json"

[server]
bind_addr = "127.0.0.1:3000"
transaction_log = "data/transactions.json"
# public_base_url = "https://route66hemp.com"

[cart]
store_dir = ".route66/storage"

[logging]
level = "info"
format = "human"
# directives = "route66_server=debug,tower_http=info"

[analytics]
# measurement_id = "G-XXXXXXXXXX"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use route66_observability::{LogFormat, LogLevel};

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
        let (errors, warnings) = config.validate();
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            [server]
            bind_addr = "0.0.0.0:8080"

            [logging]
            format = "json"
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.server.transaction_log, "data/transactions.json");
        assert_eq!(config.catalog.path, "data/products.json");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route66.json");
        std::fs::write(
            &path,
            r#"{"catalog": {"path": "catalog.json"}, "analytics": {"measurement_id": "G-ABC123"}}"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.catalog.path, "catalog.json");
        assert_eq!(config.analytics.measurement_id.as_deref(), Some("G-ABC123"));
    }

    #[test]
    fn test_validate_reports_errors_and_warnings() {
        let mut config = CliConfig::default();
        config.server.bind_addr = "localhost".to_string();
        config.server.public_base_url = Some("http://example.com".to_string());
        config.analytics.measurement_id = Some("UA-1".to_string());

        let (errors, warnings) = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("bind_addr"));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = CliConfig::default();
        config.server.public_base_url = Some("ftp://example.com".to_string());
        let (errors, _) = config.validate();
        assert!(errors[0].contains("public_base_url"));
    }
}
