use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, ServiceArea};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("CAREFIND_ENV", "development"));
    let log_level = or_default("CAREFIND_LOG_LEVEL", "info");

    let service_area = ServiceArea::new(
        &or_default("CAREFIND_SERVICE_CITY", "New York"),
        &or_default("CAREFIND_SERVICE_STATE", "NY"),
    );
    if service_area.city.is_empty() || service_area.state.is_empty() {
        return Err(ConfigError::Validation(
            "service city and state must be non-empty".to_string(),
        ));
    }

    let user_agent = or_default("CAREFIND_USER_AGENT", "carefind/0.1 (care-discovery)");
    let request_timeout_secs = parse_u64("CAREFIND_REQUEST_TIMEOUT_SECS", "30")?;

    let registry_base_url = or_default(
        "CAREFIND_REGISTRY_BASE_URL",
        "https://npiregistry.cms.hhs.gov/api/",
    );
    let registry_result_limit = parse_u32("CAREFIND_REGISTRY_RESULT_LIMIT", "100")?;
    if registry_result_limit == 0 || registry_result_limit > 200 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAREFIND_REGISTRY_RESULT_LIMIT".to_string(),
            reason: "must be between 1 and 200".to_string(),
        });
    }

    let radius_base_url = or_default(
        "CAREFIND_RADIUS_BASE_URL",
        "https://www.zipcodeapi.com/rest/",
    );
    let zipcodeapi_key = optional("ZIPCODEAPI_KEY");

    let geocoder_base_url = or_default(
        "CAREFIND_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org/",
    );
    let geocoder_timeout_secs = parse_u64("CAREFIND_GEOCODER_TIMEOUT_SECS", "60")?;
    let geocoder_min_delay_ms = parse_u64("CAREFIND_GEOCODER_MIN_DELAY_MS", "3000")?;
    let geocoder_max_retries = parse_u32("CAREFIND_GEOCODER_MAX_RETRIES", "3")?;
    let geocoder_retry_backoff_base_ms =
        parse_u64("CAREFIND_GEOCODER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let routing_base_url = or_default("CAREFIND_ROUTING_BASE_URL", "https://api.mapbox.com/");
    let mapbox_access_token = optional("MAPBOX_ACCESS_TOKEN");

    // The routing matrix accepts 25 coordinates; one is the origin.
    let max_candidates = parse_usize("CAREFIND_MAX_CANDIDATES", "20")?;
    if max_candidates == 0 || max_candidates > 24 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAREFIND_MAX_CANDIDATES".to_string(),
            reason: "must be between 1 and 24".to_string(),
        });
    }

    let max_radius_expansions = parse_u32("CAREFIND_MAX_RADIUS_EXPANSIONS", "2")?;
    let initial_radius_miles = parse_u32("CAREFIND_INITIAL_RADIUS_MILES", "1")?;
    let radius_step_miles = parse_u32("CAREFIND_RADIUS_STEP_MILES", "1")?;
    if initial_radius_miles == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAREFIND_INITIAL_RADIUS_MILES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let symptoms_path = optional("CAREFIND_SYMPTOMS_PATH").map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        service_area,
        user_agent,
        request_timeout_secs,
        registry_base_url,
        registry_result_limit,
        radius_base_url,
        zipcodeapi_key,
        geocoder_base_url,
        geocoder_timeout_secs,
        geocoder_min_delay_ms,
        geocoder_max_retries,
        geocoder_retry_backoff_base_ms,
        routing_base_url,
        mapbox_access_token,
        max_candidates,
        max_radius_expansions,
        initial_radius_miles,
        radius_step_miles,
        symptoms_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
