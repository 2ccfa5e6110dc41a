use thiserror::Error;

/// Failures reported by a metrics backend client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Could not decode backend response: {0}")]
    Decode(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Failures while reducing one metric over its window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Datapoint for '{metric}' has no '{statistic}' value")]
    MissingStatistic { metric: String, statistic: String },

    #[error("Expected at most one datapoint for '{metric}', backend returned {count}")]
    UnexpectedDatapoints { metric: String, count: usize },
}

/// Failures while computing an SLI ratio.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliError {
    #[error("Denominator is zero (numerator {numerator})")]
    DivisionByZero { numerator: f64 },

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl SliError {
    /// Zero denominators mean "no traffic in this window", not a fault.
    pub fn is_no_data(&self) -> bool {
        matches!(self, SliError::DivisionByZero { .. })
    }
}

pub type Result<T> = std::result::Result<T, SliError>;
