use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    /// Denominator summed to zero over the window.
    NoData,
    QueryFailed(String),
    WriteFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data (denominator is zero)"),
            SkipReason::QueryFailed(message) => write!(f, "query failed: {}", message),
            SkipReason::WriteFailed(message) => write!(f, "write failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SliStatus {
    Published { metric_name: String, value: f64 },
    /// Computed but not written.
    DryRun { metric_name: String, value: f64 },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliOutcome {
    pub sli: String,
    #[serde(flatten)]
    pub status: SliStatus,
}

impl SliOutcome {
    /// The computed ratio, whether or not it was written.
    pub fn value(&self) -> Option<f64> {
        match &self.status {
            SliStatus::Published { value, .. } | SliStatus::DryRun { value, .. } => Some(*value),
            SliStatus::Skipped { .. } => None,
        }
    }

    pub fn metric_name(&self) -> Option<&str> {
        match &self.status {
            SliStatus::Published { metric_name, .. } | SliStatus::DryRun { metric_name, .. } => {
                Some(metric_name)
            }
            SliStatus::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.status {
            SliStatus::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Result of one publishing run, one outcome per SLI in processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    pub run_id: String,
    pub namespace: String,
    pub prefix: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<SliOutcome>,
}

impl PublishReport {
    pub fn published_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SliStatus::Published { .. }))
            .count()
    }

    pub fn dry_run_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SliStatus::DryRun { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skip_reason().is_some()).count()
    }

    /// Skips caused by query or write errors, excluding empty windows.
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.skip_reason(), Some(reason) if *reason != SkipReason::NoData))
            .count()
    }

    pub fn outcome(&self, sli: &str) -> Option<&SliOutcome> {
        self.outcomes.iter().find(|o| o.sli == sli)
    }

    pub fn duration(&self) -> std::time::Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}
