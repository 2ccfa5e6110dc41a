use crate::backend::MetricsBackend;
use crate::error::QueryError;
use crate::query::MetricQuery;

/// Several metrics added together, e.g. one per host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeMetric {
    queries: Vec<MetricQuery>,
}

impl CompositeMetric {
    pub fn new(queries: Vec<MetricQuery>) -> Self {
        Self { queries }
    }

    pub fn queries(&self) -> &[MetricQuery] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Fetch every constituent in declared order. The first failure aborts
    /// the sum.
    pub async fn sum<B>(&self, backend: &B) -> Result<f64, QueryError>
    where
        B: MetricsBackend + ?Sized,
    {
        let mut total = 0.0;
        for query in &self.queries {
            total += query.fetch(backend).await?;
        }
        Ok(total)
    }
}
