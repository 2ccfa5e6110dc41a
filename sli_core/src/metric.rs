use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Standard reducers the backend computes per aggregation period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Statistic {
    SampleCount,
    Average,
    Sum,
    Minimum,
    Maximum,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::SampleCount,
        Statistic::Average,
        Statistic::Sum,
        Statistic::Minimum,
        Statistic::Maximum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::SampleCount => "SampleCount",
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .iter()
            .copied()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unrecognized statistic '{}', expected one of {}",
                    s,
                    Statistic::ALL.map(|stat| stat.as_str()).join(", ")
                )
            })
    }
}

/// How each datapoint is reduced to a number, resolved once when the
/// metric is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reducer {
    Standard(Statistic),
    /// Percentile-style reducer such as `p99` or `tm90`.
    Extended(String),
}

impl Reducer {
    /// Extended wins when both are configured; neither means `Sum`.
    pub fn resolve(statistic: Option<Statistic>, extended_statistic: Option<String>) -> Self {
        match (statistic, extended_statistic) {
            (_, Some(extended)) => Reducer::Extended(extended),
            (Some(statistic), None) => Reducer::Standard(statistic),
            (None, None) => Reducer::default(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Reducer::Standard(statistic) => statistic.as_str(),
            Reducer::Extended(name) => name,
        }
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Reducer::Standard(Statistic::Sum)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One raw metric as configured for an SLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub reducer: Reducer,
    pub multiplier: f64,
}

impl MetricSpec {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: Vec::new(),
            reducer: Reducer::default(),
            multiplier: 1.0,
        }
    }

    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push(Dimension::new(name, value));
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn statistic(self, statistic: Statistic) -> Self {
        self.reducer(Reducer::Standard(statistic))
    }

    pub fn extended_statistic(self, name: impl Into<String>) -> Self {
        self.reducer(Reducer::Extended(name.into()))
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// `namespace/metric_name`, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.metric_name)
    }
}

/// A single aggregation period as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datapoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extended_statistics: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Datapoint {
    pub fn with_sum(sum: f64) -> Self {
        Self {
            sum: Some(sum),
            ..Self::default()
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn statistic(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::SampleCount => self.sample_count,
            Statistic::Average => self.average,
            Statistic::Sum => self.sum,
            Statistic::Minimum => self.minimum,
            Statistic::Maximum => self.maximum,
        }
    }

    /// The value selected by `reducer`, if the backend supplied it.
    pub fn value(&self, reducer: &Reducer) -> Option<f64> {
        match reducer {
            Reducer::Standard(statistic) => self.statistic(*statistic),
            Reducer::Extended(name) => self.extended_statistics.get(name).copied(),
        }
    }
}
