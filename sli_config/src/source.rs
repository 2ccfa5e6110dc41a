use crate::error::{Result, SourceError};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for ConfigFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            other => Err(SourceError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => f.write_str("json"),
            ConfigFormat::Yaml => f.write_str("yaml"),
            ConfigFormat::Toml => f.write_str("toml"),
        }
    }
}

/// Decode `contents` into a generic document, keeping key order.
pub fn parse_document(contents: &str, format: ConfigFormat) -> Result<Value> {
    let value = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(value)
}

/// Where the SLI document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliSource {
    /// JSON text, as passed through the `SLIS` environment variable.
    Inline(String),
    File(PathBuf),
}

impl SliSource {
    pub async fn load(&self) -> Result<Value> {
        match self {
            SliSource::Inline(json) => parse_document(json, ConfigFormat::Json),
            SliSource::File(path) => {
                let format = ConfigFormat::from_path(path)?;
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Io {
                        path: path.clone(),
                        source,
                    })?;
                parse_document(&contents, format)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SliSource::Inline(_) => "SLIS environment".to_string(),
            SliSource::File(path) => path.display().to_string(),
        }
    }
}
