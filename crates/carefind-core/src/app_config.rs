use std::path::PathBuf;

use crate::{ConfigError, ServiceArea};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub service_area: ServiceArea,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub registry_base_url: String,
    pub registry_result_limit: u32,
    pub radius_base_url: String,
    pub zipcodeapi_key: Option<String>,
    pub geocoder_base_url: String,
    pub geocoder_timeout_secs: u64,
    pub geocoder_min_delay_ms: u64,
    pub geocoder_max_retries: u32,
    pub geocoder_retry_backoff_base_ms: u64,
    pub routing_base_url: String,
    pub mapbox_access_token: Option<String>,
    pub max_candidates: usize,
    pub max_radius_expansions: u32,
    pub initial_radius_miles: u32,
    pub radius_step_miles: u32,
    pub symptoms_path: Option<PathBuf>,
}

impl AppConfig {
    /// The Mapbox token, which only the `find` path needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `MAPBOX_ACCESS_TOKEN` is unset.
    pub fn require_mapbox_access_token(&self) -> Result<&str, ConfigError> {
        require(self.mapbox_access_token.as_deref(), "MAPBOX_ACCESS_TOKEN")
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `ZIPCODEAPI_KEY` is unset.
    pub fn require_zipcodeapi_key(&self) -> Result<&str, ConfigError> {
        require(self.zipcodeapi_key.as_deref(), "ZIPCODEAPI_KEY")
    }
}

fn require<'a>(value: Option<&'a str>, var: &str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("service_area", &self.service_area)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("registry_base_url", &self.registry_base_url)
            .field("registry_result_limit", &self.registry_result_limit)
            .field("radius_base_url", &self.radius_base_url)
            .field(
                "zipcodeapi_key",
                &self.zipcodeapi_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_min_delay_ms", &self.geocoder_min_delay_ms)
            .field("geocoder_max_retries", &self.geocoder_max_retries)
            .field(
                "geocoder_retry_backoff_base_ms",
                &self.geocoder_retry_backoff_base_ms,
            )
            .field("routing_base_url", &self.routing_base_url)
            .field(
                "mapbox_access_token",
                &self.mapbox_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("max_candidates", &self.max_candidates)
            .field("max_radius_expansions", &self.max_radius_expansions)
            .field("initial_radius_miles", &self.initial_radius_miles)
            .field("radius_step_miles", &self.radius_step_miles)
            .field("symptoms_path", &self.symptoms_path)
            .finish()
    }
}

