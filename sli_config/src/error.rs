use std::path::PathBuf;
use thiserror::Error;

/// Why a single SLI entry was rejected. Fields are dotted paths such as
/// `numerator[1].statistic`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("field '{field}' is invalid: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },
}

impl ConfigError {
    pub fn field(&self) -> &str {
        match self {
            ConfigError::MissingField { field }
            | ConfigError::InvalidType { field, .. }
            | ConfigError::InvalidValue { field, .. }
            | ConfigError::UnknownField { field } => field,
        }
    }
}

/// Problems with the SLI document as a whole. These abort the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported format '{0}'. Use .json, .yaml, .yml, or .toml")]
    UnsupportedFormat(String),

    #[error("SLI document must be a mapping of SLI name to definition, found {0}")]
    NotAMapping(&'static str),

    #[error("Default window must be between 1 and {max} days, got {0}", max = sli_core::MAX_WINDOW_DAYS)]
    InvalidDefaultWindow(u32),
}

pub type Result<T> = std::result::Result<T, SourceError>;
