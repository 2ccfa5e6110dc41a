use crate::backend::{MetricsBackend, StatisticsRequest};
use crate::error::QueryError;
use crate::metric::{Datapoint, MetricSpec};
use crate::window::Window;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do when a whole-window request comes back split into several
/// datapoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatapointPolicy {
    /// Sum every returned datapoint.
    #[default]
    SumAll,
    /// Reject responses with more than one datapoint.
    ExactlyOne,
}

/// One metric bound to a concrete window.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    spec: MetricSpec,
    window: Window,
    policy: DatapointPolicy,
}

impl MetricQuery {
    pub fn new(spec: MetricSpec, window: Window) -> Self {
        Self {
            spec,
            window,
            policy: DatapointPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DatapointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn request(&self) -> StatisticsRequest {
        StatisticsRequest {
            namespace: self.spec.namespace.clone(),
            metric_name: self.spec.metric_name.clone(),
            dimensions: self.spec.dimensions.clone(),
            start_time: self.window.start,
            end_time: self.window.end,
            period: self.window.period_secs(),
            reducer: self.spec.reducer.clone(),
        }
    }

    /// Query the backend once and reduce the window to a scalar.
    pub async fn fetch<B>(&self, backend: &B) -> Result<f64, QueryError>
    where
        B: MetricsBackend + ?Sized,
    {
        let datapoints = backend.get_metric_statistics(&self.request()).await?;
        self.reduce(&datapoints)
    }

    /// Sum the configured statistic across `datapoints`, then scale.
    pub fn reduce(&self, datapoints: &[Datapoint]) -> Result<f64, QueryError> {
        if datapoints.len() > 1 {
            match self.policy {
                DatapointPolicy::SumAll => debug!(
                    "{} returned {} datapoints for a single-period window, summing",
                    self.spec.qualified_name(),
                    datapoints.len()
                ),
                DatapointPolicy::ExactlyOne => {
                    return Err(QueryError::UnexpectedDatapoints {
                        metric: self.spec.qualified_name(),
                        count: datapoints.len(),
                    })
                }
            }
        }

        let mut total = 0.0;
        for datapoint in datapoints {
            total += datapoint
                .value(&self.spec.reducer)
                .ok_or_else(|| QueryError::MissingStatistic {
                    metric: self.spec.qualified_name(),
                    statistic: self.spec.reducer.name().to_string(),
                })?;
        }
        Ok(total * self.spec.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, MetricSeries, MockMetricsBackend};
    use crate::error::BackendError;
    use crate::metric::{Reducer, Statistic};
    use chrono::{TimeZone, Utc};

    fn window() -> Window {
        Window::ending_at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), 7).unwrap()
    }

    #[test]
    fn test_request_spans_whole_window() {
        let query = MetricQuery::new(
            MetricSpec::new("prod/sli", "Success")
                .dimension("Hostname", "idp")
                .statistic(Statistic::SampleCount),
            window(),
        );

        let request = query.request();
        assert_eq!(request.period, 7 * 86_400);
        assert_eq!(request.start_time, window().start);
        assert_eq!(request.end_time, window().end);
        assert_eq!(request.reducer, Reducer::Standard(Statistic::SampleCount));
        assert_eq!(request.dimensions.len(), 1);
    }

    #[test]
    fn test_reduce_sums_and_scales() {
        let query = MetricQuery::new(MetricSpec::new("ns", "m").multiplier(0.5), window());
        let datapoints = vec![Datapoint::with_sum(10.0), Datapoint::with_sum(30.0)];

        assert_eq!(query.reduce(&datapoints).unwrap(), 20.0);
        assert_eq!(query.reduce(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_reduce_extended_statistic() {
        let query = MetricQuery::new(MetricSpec::new("ns", "m").extended_statistic("p99"), window());
        let mut datapoint = Datapoint::default();
        datapoint.extended_statistics.insert("p99".to_string(), 1.25);

        assert_eq!(query.reduce(&[datapoint]).unwrap(), 1.25);
    }

    #[test]
    fn test_missing_statistic_is_an_error() {
        let query = MetricQuery::new(
            MetricSpec::new("ns", "Latency").statistic(Statistic::Average),
            window(),
        );

        let err = query.reduce(&[Datapoint::with_sum(3.0)]).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingStatistic {
                metric: "ns/Latency".to_string(),
                statistic: "Average".to_string(),
            }
        );
    }

    #[test]
    fn test_exactly_one_policy_rejects_split_windows() {
        let query = MetricQuery::new(MetricSpec::new("ns", "m"), window())
            .with_policy(DatapointPolicy::ExactlyOne);

        assert_eq!(query.reduce(&[Datapoint::with_sum(4.0)]).unwrap(), 4.0);
        assert_eq!(query.reduce(&[]).unwrap(), 0.0);
        assert!(matches!(
            query.reduce(&[Datapoint::with_sum(1.0), Datapoint::with_sum(2.0)]),
            Err(QueryError::UnexpectedDatapoints { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_is_idempotent() {
        let backend = InMemoryBackend::new().with_series(
            MetricSeries::new("ns", "m")
                .datapoint(Datapoint::with_sum(40.0))
                .datapoint(Datapoint::with_sum(2.0)),
        );
        let query = MetricQuery::new(MetricSpec::new("ns", "m"), window());

        let first = query.fetch(&backend).await.unwrap();
        let second = query.fetch(&backend).await.unwrap();
        assert_eq!(first, 42.0);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_retried() {
        let mut backend = MockMetricsBackend::new();
        backend
            .expect_get_metric_statistics()
            .times(1)
            .returning(|_| Err(BackendError::Transport("connection reset".to_string())));

        let query = MetricQuery::new(MetricSpec::new("ns", "m"), window());
        let err = query.fetch(&backend).await.unwrap_err();
        assert_eq!(
            err,
            QueryError::Backend(BackendError::Transport("connection reset".to_string()))
        );
    }
}
