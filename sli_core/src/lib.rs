pub mod backend;
pub mod composite;
pub mod definition;
pub mod error;
pub mod metric;
pub mod query;
pub mod window;

pub use backend::{
    DynBackend, HttpBackend, HttpBackendConfig, InMemoryBackend, MetricDatum, MetricSeries,
    MetricsBackend, StatisticsRequest,
};
pub use composite::CompositeMetric;
pub use definition::{SliDefinition, SliSet};
pub use error::{BackendError, QueryError, Result, SliError};
pub use metric::{Datapoint, Dimension, MetricSpec, Reducer, Statistic};
pub use query::{DatapointPolicy, MetricQuery};
pub use window::{Window, MAX_WINDOW_DAYS};
