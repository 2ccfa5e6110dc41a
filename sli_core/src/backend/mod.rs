pub mod http;
pub mod memory;

use crate::error::BackendError;
use crate::metric::{Datapoint, Dimension, Reducer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use http::{HttpBackend, HttpBackendConfig};
pub use memory::{InMemoryBackend, MetricSeries, RecordedWrite};

/// Parameters of one "get statistics" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub period: u64,
    pub reducer: Reducer,
}

/// One derived data point to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDatum {
    pub metric_name: String,
    pub value: f64,
    /// `None` lets the backend stamp the write with its current time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MetricDatum {
    pub fn now(metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            timestamp: None,
        }
    }
}

/// The external time-series store SLIs are read from and written to.
///
/// One client is built per invocation and shared by every query and write
/// in it. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Datapoints for one metric over the request's window, in any order.
    async fn get_metric_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<Vec<Datapoint>, BackendError>;

    /// Write a single data point into `namespace`.
    async fn put_metric_data(&self, namespace: &str, datum: &MetricDatum)
        -> Result<(), BackendError>;

    fn name(&self) -> &str;
}

pub type DynBackend = Arc<dyn MetricsBackend>;
