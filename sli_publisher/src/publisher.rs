use crate::report::{PublishReport, SkipReason, SliOutcome, SliStatus};
use chrono::Utc;
use sli_core::{MetricDatum, MetricsBackend, SliDefinition, SliError, SliSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};

/// Preconditions checked before any SLI is evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Target namespace is empty")]
    EmptyNamespace,

    #[error("Metric name prefix is empty")]
    EmptyPrefix,
}

/// Name of the derived metric for `sli`.
pub fn derived_metric_name(prefix: &str, sli: &str) -> String {
    format!("{}-{}", prefix, sli)
}

/// Computes every SLI in a set and writes each ratio back to the backend.
///
/// Failures are isolated per SLI: a zero denominator, a failed query or a
/// failed write skips that SLI and the batch carries on.
pub struct Publisher<B: ?Sized> {
    backend: Arc<B>,
    dry_run: bool,
}

impl<B> Publisher<B>
where
    B: MetricsBackend + ?Sized,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            dry_run: false,
        }
    }

    /// Compute and log ratios without writing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn publish(
        &self,
        slis: &SliSet,
        namespace: &str,
        prefix: &str,
    ) -> Result<PublishReport, PublishError> {
        if namespace.trim().is_empty() {
            return Err(PublishError::EmptyNamespace);
        }
        if prefix.trim().is_empty() {
            return Err(PublishError::EmptyPrefix);
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("publish", run_id = %run_id, namespace = %namespace);

        let report = async move {
            let started_at = Utc::now();
            info!(
                "Publishing {} SLIs via {} backend{}",
                slis.len(),
                self.backend.name(),
                if self.dry_run { " (dry run)" } else { "" }
            );

            let mut outcomes = Vec::with_capacity(slis.len());
            for sli in slis {
                let status = self.publish_one(sli, namespace, prefix).await;
                outcomes.push(SliOutcome {
                    sli: sli.name().to_string(),
                    status,
                });
            }

            let report = PublishReport {
                run_id: run_id.clone(),
                namespace: namespace.to_string(),
                prefix: prefix.to_string(),
                started_at,
                finished_at: Utc::now(),
                outcomes,
            };

            info!(
                published = report.published_count(),
                skipped = report.skipped_count(),
                "Publishing run complete"
            );
            report
        }
        .instrument(span)
        .await;

        Ok(report)
    }

    async fn publish_one(&self, sli: &SliDefinition, namespace: &str, prefix: &str) -> SliStatus {
        let name = sli.name();

        let value = match sli.ratio(self.backend.as_ref()).await {
            Ok(value) => value,
            Err(SliError::DivisionByZero { numerator }) => {
                warn!(sli = %name, numerator, "x/0 for SLI, no data in window");
                return SliStatus::Skipped {
                    reason: SkipReason::NoData,
                };
            }
            Err(SliError::Query(err)) => {
                error!(sli = %name, error = %err, "Backend query failed for SLI");
                return SliStatus::Skipped {
                    reason: SkipReason::QueryFailed(err.to_string()),
                };
            }
        };

        let metric_name = derived_metric_name(prefix, name);
        info!(sli = %name, metric = %metric_name, value, "Computed SLI");

        if self.dry_run {
            return SliStatus::DryRun { metric_name, value };
        }

        let datum = MetricDatum::now(metric_name.clone(), value);
        match self.backend.put_metric_data(namespace, &datum).await {
            Ok(()) => SliStatus::Published { metric_name, value },
            Err(err) => {
                error!(sli = %name, metric = %metric_name, error = %err, "Failed to write SLI metric");
                SliStatus::Skipped {
                    reason: SkipReason::WriteFailed(err.to_string()),
                }
            }
        }
    }
}
