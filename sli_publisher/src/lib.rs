pub mod exporters;
pub mod publisher;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use exporters::{JsonExporter, MarkdownExporter, PrometheusExporter, ReportFormat};
pub use publisher::{derived_metric_name, PublishError, Publisher};
pub use report::{PublishReport, SkipReason, SliOutcome, SliStatus};
