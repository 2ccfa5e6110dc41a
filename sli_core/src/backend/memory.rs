use super::{MetricDatum, MetricsBackend, StatisticsRequest};
use crate::error::BackendError;
use crate::metric::{Datapoint, Dimension};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Stored datapoints for one (namespace, metric, dimensions) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub namespace: String,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub datapoints: Vec<Datapoint>,
}

impl MetricSeries {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: Vec::new(),
            datapoints: Vec::new(),
        }
    }

    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push(Dimension::new(name, value));
        self
    }

    pub fn datapoint(mut self, datapoint: Datapoint) -> Self {
        self.datapoints.push(datapoint);
        self
    }

    fn matches(&self, request: &StatisticsRequest) -> bool {
        self.namespace == request.namespace
            && self.metric_name == request.metric_name
            && same_dimensions(&self.dimensions, &request.dimensions)
    }
}

// Dimension order is not significant to the backend.
fn same_dimensions(left: &[Dimension], right: &[Dimension]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut left: Vec<&Dimension> = left.iter().collect();
    let mut right: Vec<&Dimension> = right.iter().collect();
    left.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
    right.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
    left == right
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedWrite {
    pub namespace: String,
    pub metric_name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Backend held entirely in process memory.
///
/// Used for offline runs seeded from a fixture file and throughout the
/// test suites. Failures can be injected per metric name.
#[derive(Default)]
pub struct InMemoryBackend {
    series: Vec<MetricSeries>,
    writes: RwLock<Vec<RecordedWrite>>,
    queries: AtomicUsize,
    failing_queries: HashSet<String>,
    failing_writes: HashSet<String>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: MetricSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Queries for `metric_name` fail with [`BackendError::Unavailable`].
    pub fn fail_queries_for(mut self, metric_name: impl Into<String>) -> Self {
        self.failing_queries.insert(metric_name.into());
        self
    }

    /// Writes of `metric_name` fail with [`BackendError::Unavailable`].
    pub fn fail_writes_for(mut self, metric_name: impl Into<String>) -> Self {
        self.failing_writes.insert(metric_name.into());
        self
    }

    /// Parse a fixture: a JSON array of [`MetricSeries`].
    pub fn from_fixture_str(contents: &str) -> Result<Self, BackendError> {
        let series: Vec<MetricSeries> = serde_json::from_str(contents)
            .map_err(|e| BackendError::Decode(format!("invalid fixture: {}", e)))?;
        Ok(Self {
            series,
            ..Self::default()
        })
    }

    pub async fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            BackendError::Unavailable(format!("cannot read fixture {}: {}", path.display(), e))
        })?;
        Self::from_fixture_str(&contents)
    }

    pub async fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    /// Most recent write of `metric_name`, if any.
    pub async fn written_value(&self, metric_name: &str) -> Option<f64> {
        self.writes
            .read()
            .await
            .iter()
            .rev()
            .find(|write| write.metric_name == metric_name)
            .map(|write| write.value)
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsBackend for InMemoryBackend {
    async fn get_metric_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<Datapoint>, BackendError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.failing_queries.contains(&request.metric_name) {
            return Err(BackendError::Unavailable(format!(
                "injected query failure for {}",
                request.metric_name
            )));
        }

        let datapoints: Vec<Datapoint> = self
            .series
            .iter()
            .filter(|series| series.matches(request))
            .flat_map(|series| series.datapoints.iter())
            .filter(|datapoint| match datapoint.timestamp {
                Some(ts) => ts >= request.start_time && ts < request.end_time,
                None => true,
            })
            .cloned()
            .collect();

        debug!(
            "In-memory query {}/{} returned {} datapoints",
            request.namespace,
            request.metric_name,
            datapoints.len()
        );

        Ok(datapoints)
    }

    async fn put_metric_data(
        &self,
        namespace: &str,
        datum: &MetricDatum,
    ) -> Result<(), BackendError> {
        if self.failing_writes.contains(&datum.metric_name) {
            return Err(BackendError::Unavailable(format!(
                "injected write failure for {}",
                datum.metric_name
            )));
        }

        self.writes.write().await.push(RecordedWrite {
            namespace: namespace.to_string(),
            metric_name: datum.metric_name.clone(),
            value: datum.value,
            timestamp: datum.timestamp.unwrap_or_else(Utc::now),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
