pub mod app_config;
pub mod config;
pub mod format;
pub mod symptoms;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use format::{format_duration, join_terms, meters_to_miles};
pub use symptoms::{load_symptom_table, parse_symptoms, SymptomTable, SymptomTerm};
pub use types::{Address, Candidate, CareTier, GeoPoint, RankedCandidate, ServiceArea};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read symptoms file {path}: {source}")]
    SymptomsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse symptoms file: {0}")]
    SymptomsFileParse(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Malformed user input. Raised by the intake helpers, never by the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("at least one symptom must be entered")]
    NoSymptoms,

    #[error("invalid symptom term \"{0}\"")]
    InvalidSymptom(String),

    #[error("street address must be non-empty")]
    EmptyStreet,

    #[error("\"{0}\" is not a 5-digit postal code")]
    InvalidPostalCode(String),
}
