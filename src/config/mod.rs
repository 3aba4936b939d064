//! Configuration management
//!
//! Two layers: the API endpoints the browser talks to (baked in at build
//! time, since the WASM bundle has no process environment) and the server
//! binary's own settings (file + `ODONTO_*` environment variables).

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_ML_URL: &str = "http://localhost:5000";

/// Standard request timeout
const REQUEST_TIMEOUT_SECS: u64 = 10;
/// Timeout for large uploads (report creation carries a full chart snapshot)
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Where the REST backend and the ML service live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_ml_url")]
    pub ml_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_ml_url() -> String {
    DEFAULT_ML_URL.to_string()
}

fn default_request_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_upload_timeout() -> u64 {
    UPLOAD_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ml_url: default_ml_url(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
        }
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Accept an http(s) base URL, otherwise fall back to `default`
fn base_url_or(raw: Option<&str>, default: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return default.to_string();
    };
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => raw.to_string(),
        Ok(parsed) => {
            tracing::warn!("Ignoring API base URL with scheme {}: {}", parsed.scheme(), raw);
            default.to_string()
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid API base URL {}: {}", raw, e);
            default.to_string()
        }
    }
}

impl ApiConfig {
    /// Endpoints baked in by `ODONTO_API_URL` / `ODONTO_ML_URL` at build time
    pub fn from_build_env() -> Self {
        Self {
            api_url: base_url_or(option_env!("ODONTO_API_URL"), DEFAULT_API_URL),
            ml_url: base_url_or(option_env!("ODONTO_ML_URL"), DEFAULT_ML_URL),
            ..Default::default()
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        join(&self.api_url, path)
    }

    pub fn ml_endpoint(&self, path: &str) -> String {
        join(&self.ml_url, path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}

/// Server binary settings
#[cfg(feature = "server")]
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

#[cfg(feature = "server")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "server")]
fn default_port() -> u16 {
    8080
}

#[cfg(feature = "server")]
fn default_log_filter() -> String {
    "odonto_dashboard=debug,tower_http=debug".to_string()
}

/// Directory holding `config.toml` (overridable with `ODONTO_CONFIG_DIR`)
#[cfg(feature = "server")]
pub fn get_config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("ODONTO_CONFIG_DIR") {
        return std::path::PathBuf::from(dir);
    }
    directories::ProjectDirs::from("br", "odontolegal", "odonto-dashboard")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}

#[cfg(feature = "server")]
pub fn load_config() -> anyhow::Result<ServerConfig> {
    let config = ::config::Config::builder()
        // Load from config file if it exists
        .add_source(
            ::config::File::with_name(&get_config_dir().join("config").to_string_lossy())
                .required(false),
        )
        // Override with environment variables (ODONTO_PORT, ODONTO_LOG_FILTER, etc.)
        .add_source(
            ::config::Environment::with_prefix("ODONTO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
