//! Turns a loosely-typed SLI document into validated [`SliDefinition`]s.
//!
//! Each entry is validated on its own. A malformed entry is recorded as a
//! [`SkippedSli`] and the remaining entries are still parsed.

use crate::error::{ConfigError, Result, SourceError};
use crate::source::{parse_document, ConfigFormat, SliSource};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sli_core::{
    CompositeMetric, DatapointPolicy, Dimension, MetricQuery, MetricSpec, Reducer, SliDefinition,
    SliSet, Statistic, Window, MAX_WINDOW_DAYS,
};
use tracing::{debug, warn};

const SLI_FIELDS: &[&str] = &["numerator", "denominator", "window_days"];
const METRIC_FIELDS: &[&str] = &[
    "namespace",
    "metric_name",
    "dimensions",
    "statistic",
    "extended_statistic",
    "multiplier",
];

/// An entry dropped during parsing, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSli {
    pub name: String,
    pub error: ConfigError,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSlis {
    pub slis: SliSet,
    pub skipped: Vec<SkippedSli>,
}

impl ParsedSlis {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

pub struct SliParser {
    default_window_days: u32,
    now: DateTime<Utc>,
    policy: DatapointPolicy,
}

impl SliParser {
    /// Entries without `window_days` use `default_window_days`.
    pub fn new(default_window_days: u32) -> Result<Self> {
        if default_window_days == 0 || default_window_days > MAX_WINDOW_DAYS {
            return Err(SourceError::InvalidDefaultWindow(default_window_days));
        }
        Ok(Self {
            default_window_days,
            now: Utc::now(),
            policy: DatapointPolicy::default(),
        })
    }

    /// Fix the end of every window produced by this parser.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn policy(mut self, policy: DatapointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn default_window_days(&self) -> u32 {
        self.default_window_days
    }

    pub async fn parse_source(&self, source: &SliSource) -> Result<ParsedSlis> {
        let document = source.load().await?;
        self.parse_value(&document)
    }

    pub fn parse_str(&self, contents: &str, format: ConfigFormat) -> Result<ParsedSlis> {
        let document = parse_document(contents, format)?;
        self.parse_value(&document)
    }

    /// Only a non-mapping document is fatal; bad entries are skipped.
    pub fn parse_value(&self, document: &Value) -> Result<ParsedSlis> {
        let entries = document
            .as_object()
            .ok_or_else(|| SourceError::NotAMapping(type_name(document)))?;

        let mut parsed = ParsedSlis::default();
        for (name, entry) in entries {
            match self.parse_entry(name, entry) {
                Ok(definition) => {
                    debug!(
                        sli = %name,
                        window_days = definition.window_days(),
                        "Parsed SLI definition"
                    );
                    parsed.slis.insert(definition);
                }
                Err(error) => {
                    warn!(sli = %name, error = %error, "Skipping malformed SLI");
                    parsed.skipped.push(SkippedSli {
                        name: name.clone(),
                        error,
                    });
                }
            }
        }
        Ok(parsed)
    }

    pub fn parse_entry(
        &self,
        name: &str,
        entry: &Value,
    ) -> std::result::Result<SliDefinition, ConfigError> {
        let object = entry.as_object().ok_or_else(|| ConfigError::InvalidType {
            field: "entry".to_string(),
            expected: "an object",
        })?;
        reject_unknown(object, SLI_FIELDS, "")?;

        let window_days = match object.get("window_days") {
            None | Some(Value::Null) => self.default_window_days,
            Some(value) => parse_window_days(value)?,
        };
        let window = Window::ending_at(self.now, window_days).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "window_days".to_string(),
                reason: format!("{} days reaches past the earliest representable time", window_days),
            }
        })?;

        let numerator = self.parse_composite(object, "numerator", window)?;
        let denominator = self.parse_composite(object, "denominator", window)?;

        Ok(SliDefinition::new(name, numerator, denominator, window_days))
    }

    fn parse_composite(
        &self,
        object: &Map<String, Value>,
        field: &str,
        window: Window,
    ) -> std::result::Result<CompositeMetric, ConfigError> {
        let specs = require(object, field, "")?
            .as_array()
            .ok_or_else(|| invalid_type(field, "a list of metric specifications"))?;
        if specs.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: "must contain at least one metric".to_string(),
            });
        }

        let queries = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let path = format!("{}[{}]", field, i);
                parse_metric_spec(spec, &path)
                    .map(|spec| MetricQuery::new(spec, window).with_policy(self.policy))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CompositeMetric::new(queries))
    }
}

fn parse_window_days(value: &Value) -> std::result::Result<u32, ConfigError> {
    let days = value
        .as_i64()
        .ok_or_else(|| invalid_type("window_days", "an integer"))?;
    if days < 1 {
        return Err(ConfigError::InvalidValue {
            field: "window_days".to_string(),
            reason: format!("must be at least 1 day, got {}", days),
        });
    }
    match u32::try_from(days) {
        Ok(days) if days <= MAX_WINDOW_DAYS => Ok(days),
        _ => Err(ConfigError::InvalidValue {
            field: "window_days".to_string(),
            reason: format!("must be at most {} days, got {}", MAX_WINDOW_DAYS, days),
        }),
    }
}

fn parse_metric_spec(value: &Value, path: &str) -> std::result::Result<MetricSpec, ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_type(path, "an object"))?;
    reject_unknown(object, METRIC_FIELDS, path)?;

    let namespace = non_empty_string(object, "namespace", path)?;
    let metric_name = non_empty_string(object, "metric_name", path)?;

    let dimensions_path = join(path, "dimensions");
    let dimensions = require(object, "dimensions", path)?
        .as_array()
        .ok_or_else(|| invalid_type(&dimensions_path, "a list of {Name, Value} objects"))?
        .iter()
        .enumerate()
        .map(|(i, dimension)| parse_dimension(dimension, &format!("{}[{}]", dimensions_path, i)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let statistic = match optional_string(object, "statistic", path)? {
        Some(name) => Some(name.parse::<Statistic>().map_err(|reason| {
            ConfigError::InvalidValue {
                field: join(path, "statistic"),
                reason,
            }
        })?),
        None => None,
    };

    let extended_statistic = optional_string(object, "extended_statistic", path)?;
    if extended_statistic.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: join(path, "extended_statistic"),
            reason: "must not be empty".to_string(),
        });
    }

    let multiplier = match object.get("multiplier") {
        None | Some(Value::Null) => 1.0,
        Some(value) => value
            .as_f64()
            .ok_or_else(|| invalid_type(&join(path, "multiplier"), "a number"))?,
    };

    Ok(MetricSpec {
        namespace,
        metric_name,
        dimensions,
        reducer: Reducer::resolve(statistic, extended_statistic.map(str::to_string)),
        multiplier,
    })
}

fn parse_dimension(value: &Value, path: &str) -> std::result::Result<Dimension, ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_type(path, "an object with Name and Value"))?;

    let mut name = None;
    let mut dimension_value = None;
    for (key, field) in object {
        let slot = match key.as_str() {
            "Name" | "name" => &mut name,
            "Value" | "value" => &mut dimension_value,
            _ => {
                return Err(ConfigError::UnknownField {
                    field: join(path, key),
                })
            }
        };
        let text = field
            .as_str()
            .ok_or_else(|| invalid_type(&join(path, key), "a string"))?;
        *slot = Some(text.to_string());
    }

    match (name, dimension_value) {
        (Some(name), Some(value)) => Ok(Dimension::new(name, value)),
        (None, _) => Err(ConfigError::MissingField {
            field: join(path, "Name"),
        }),
        (_, None) => Err(ConfigError::MissingField {
            field: join(path, "Value"),
        }),
    }
}

fn require<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    path: &str,
) -> std::result::Result<&'a Value, ConfigError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ConfigError::MissingField {
            field: join(path, field),
        }),
        Some(value) => Ok(value),
    }
}

fn non_empty_string(
    object: &Map<String, Value>,
    field: &str,
    path: &str,
) -> std::result::Result<String, ConfigError> {
    let text = require(object, field, path)?
        .as_str()
        .ok_or_else(|| invalid_type(&join(path, field), "a string"))?;
    if text.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: join(path, field),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(text.to_string())
}

fn optional_string<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    path: &str,
) -> std::result::Result<Option<&'a str>, ConfigError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid_type(&join(path, field), "a string")),
    }
}

fn reject_unknown(
    object: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> std::result::Result<(), ConfigError> {
    match object.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(ConfigError::UnknownField {
            field: join(path, key),
        }),
        None => Ok(()),
    }
}

fn invalid_type(field: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidType {
        field: field.to_string(),
        expected,
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
