//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::PipelineConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_DATA_FILE: &str = "stations.json";
pub const DEFAULT_LANGUAGE: &str = "sk";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Address the HTTP server listens on (`BIKESHARE_BIND`).
    pub bind: SocketAddr,

    /// Station data file (`BIKESHARE_DATA_FILE`).
    pub data_file: PathBuf,

    /// Seed file read when the data file doesn't exist yet (`BIKESHARE_FALLBACK_DATA_FILE`).
    pub fallback_data_file: Option<PathBuf>,

    /// Pacing and provider timeout (`BIKESHARE_PACING_MS`, `BIKESHARE_PROVIDER_TIMEOUT_SECS`).
    pub pipeline: PipelineConfig,

    /// Base URL of the local reverse-geocode endpoint (`BIKESHARE_LOCAL_GEOCODER_URL`).
    /// Defaults to this server.
    pub local_geocoder_url: String,

    /// Language for provider results (`BIKESHARE_LANGUAGE`).
    pub language: String,

    /// Contact address sent to Nominatim (`BIKESHARE_CONTACT_EMAIL`).
    pub contact_email: Option<String>,

    /// Directory of static dashboard assets (`BIKESHARE_STATIC_DIR`).
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or empty values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind: SocketAddr = parse_or(get("BIKESHARE_BIND"), "BIKESHARE_BIND", DEFAULT_BIND)?;

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            pacing_ms: parse_or(
                get("BIKESHARE_PACING_MS"),
                "BIKESHARE_PACING_MS",
                &defaults.pacing_ms.to_string(),
            )?,
            provider_timeout_secs: parse_or(
                get("BIKESHARE_PROVIDER_TIMEOUT_SECS"),
                "BIKESHARE_PROVIDER_TIMEOUT_SECS",
                &defaults.provider_timeout_secs.to_string(),
            )?,
        };

        if pipeline.provider_timeout_secs == 0 {
            return Err(ConfigError {
                key: "BIKESHARE_PROVIDER_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            bind,
            data_file: get("BIKESHARE_DATA_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),
            fallback_data_file: get("BIKESHARE_FALLBACK_DATA_FILE").map(PathBuf::from),
            pipeline,
            local_geocoder_url: get("BIKESHARE_LOCAL_GEOCODER_URL")
                .unwrap_or_else(|| format!("http://{bind}")),
            language: get("BIKESHARE_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            contact_email: get("BIKESHARE_CONTACT_EMAIL"),
            static_dir: get("BIKESHARE_STATIC_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
