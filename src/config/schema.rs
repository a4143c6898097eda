use anyhow::{bail, Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::traits::{ConfigIssue, ConfigIssueSeverity};
use crate::dispatch::MissingHandlerPolicy;

pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";
pub const DEFAULT_REPLY_TIMEOUT_SECS: u64 = 30;

// ── Top-level config ──────────────────────────────────────────────

/// Top-level linehook configuration, loaded from `config.toml`.
///
/// Resolution order: `--config <path>` → `~/.linehook/config.toml` → built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Webhook HTTP server (`[gateway]`).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Messaging API channel credentials (`[line]`).
    #[serde(default)]
    pub line: LineConfig,

    /// Event dispatch behaviour (`[dispatch]`).
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

// ── Gateway ──────────────────────────────────────────────────────

/// Gateway server configuration (`[gateway]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 8080)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Path the platform posts webhook batches to (default: `/webhook`)
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Largest accepted webhook body in bytes (default: 1 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/webhook".into()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            webhook_path: default_webhook_path(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ── LINE channel ─────────────────────────────────────────────────

/// Channel credentials (`[line]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures.
    /// Can also be set via `LINEHOOK_CHANNEL_SECRET`.
    #[serde(default)]
    pub channel_secret: Option<String>,
    /// Long-lived channel access token used for the reply API.
    /// Can also be set via `LINEHOOK_CHANNEL_ACCESS_TOKEN`.
    #[serde(default)]
    pub channel_access_token: Option<String>,
    /// Messaging API base URL (default: `https://api.line.me`)
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
    /// Timeout for one reply API call, in seconds. Default: `30`.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,
}

fn default_line_api_base_url() -> String {
    DEFAULT_LINE_API_BASE_URL.into()
}

fn default_reply_timeout_secs() -> u64 {
    DEFAULT_REPLY_TIMEOUT_SECS
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: None,
            channel_access_token: None,
            api_base_url: default_line_api_base_url(),
            reply_timeout_secs: default_reply_timeout_secs(),
        }
    }
}

// ── Dispatch ─────────────────────────────────────────────────────

/// Dispatch configuration (`[dispatch]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// `"report"` (default) logs and records events nobody handles; `"ignore"` drops them.
    #[serde(default)]
    pub missing_handler: MissingHandlerPolicy,
}

// ── Config impl ──────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: default_config_path().unwrap_or_else(|_| PathBuf::from("config.toml")),
            gateway: GatewayConfig::default(),
            line: LineConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

fn default_config_path() -> Result<PathBuf> {
    let home = UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".linehook").join("config.toml"))
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path).await.with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str::<Config>(&contents).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else if path.is_some() {
            bail!("Config file not found: {}", config_path.display());
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "no config file found, using defaults"
            );
            Config::default()
        };

        config.config_path = config_path;
        Ok(config)
    }

    /// Apply `LINEHOOK_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(secret) = non_empty("LINEHOOK_CHANNEL_SECRET") {
            self.line.channel_secret = Some(secret);
        }
        if let Some(token) = non_empty("LINEHOOK_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = Some(token);
        }
        if let Some(port) = non_empty("LINEHOOK_PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid LINEHOOK_PORT"),
            }
        }
        if let Some(host) = non_empty("LINEHOOK_HOST") {
            self.gateway.host = host;
        }
    }

    /// Check consistency. Errors make `serve` refuse to start.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.line.channel_secret.as_deref().map_or(true, str::is_empty) {
            issues.push(ConfigIssue::error(
                "line.channel_secret",
                "missing; webhook signatures cannot be verified",
            ));
        }
        if self
            .line
            .channel_access_token
            .as_deref()
            .map_or(true, str::is_empty)
        {
            issues.push(ConfigIssue::error(
                "line.channel_access_token",
                "missing; replies cannot be sent",
            ));
        }
        if !self.gateway.webhook_path.starts_with('/') {
            issues.push(ConfigIssue::error(
                "gateway.webhook_path",
                "must start with '/'",
            ));
        }
        if self.gateway.max_body_bytes == 0 {
            issues.push(ConfigIssue::error(
                "gateway.max_body_bytes",
                "must be greater than zero",
            ));
        }
        if !self.line.api_base_url.starts_with("https://") {
            issues.push(ConfigIssue::warning(
                "line.api_base_url",
                "not an https URL; reply tokens will travel unencrypted",
            ));
        }
        if self.line.reply_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "line.reply_timeout_secs",
                "zero timeout makes every reply fail immediately",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn complete_config() -> Config {
        let mut config = Config::default();
        config.line.channel_secret = Some("secret".into());
        config.line.channel_access_token = Some("token".into());
        config
    }

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.webhook_path, "/webhook");
        assert_eq!(config.line.api_base_url, DEFAULT_LINE_API_BASE_URL);
        assert_eq!(
            config.dispatch.missing_handler,
            MissingHandlerPolicy::Report
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            port = 9000

            [dispatch]
            missing_handler = "ignore"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.webhook_path, "/webhook");
        assert_eq!(config.line.reply_timeout_secs, DEFAULT_REPLY_TIMEOUT_SECS);
        assert_eq!(
            config.dispatch.missing_handler,
            MissingHandlerPolicy::Ignore
        );
    }

    #[tokio::test]
    async fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[line]\nchannel_secret = \"s\"\nchannel_access_token = \"t\"\n",
        )
        .await
        .unwrap();

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.line.channel_secret.as_deref(), Some("s"));
        assert!(config
            .validate()
            .iter()
            .all(|issue| issue.severity != ConfigIssueSeverity::Error));
    }

    #[tokio::test]
    async fn load_fails_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Config::load(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn load_reports_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gateway\nport = ").await.unwrap();
        let err = Config::load(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_apply_non_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LINEHOOK_CHANNEL_SECRET", "env-secret"),
            ("LINEHOOK_CHANNEL_ACCESS_TOKEN", ""),
            ("LINEHOOK_PORT", "9443"),
        ]);
        let mut config = Config::default();
        config.line.channel_access_token = Some("file-token".into());

        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.line.channel_secret.as_deref(), Some("env-secret"));
        assert_eq!(config.line.channel_access_token.as_deref(), Some("file-token"));
        assert_eq!(config.gateway.port, 9443);
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| (key == "LINEHOOK_PORT").then(|| "http".to_string()));
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn validate_flags_missing_credentials() {
        let issues = Config::default().validate();
        let fields: Vec<&str> = issues
            .iter()
            .filter(|i| i.severity == ConfigIssueSeverity::Error)
            .map(|i| i.field.as_str())
            .collect();
        assert!(fields.contains(&"line.channel_secret"));
        assert!(fields.contains(&"line.channel_access_token"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(complete_config().validate().is_empty());
    }

    #[test]
    fn validate_rejects_relative_webhook_path() {
        let mut config = complete_config();
        config.gateway.webhook_path = "webhook".into();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "gateway.webhook_path");
    }

    #[test]
    fn validate_warns_on_plain_http_api() {
        let mut config = complete_config();
        config.line.api_base_url = "http://localhost:9000".into();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigIssueSeverity::Warning);
    }
}
