use crate::report::{PublishReport, SliStatus};

pub struct MarkdownExporter;

impl MarkdownExporter {
    pub fn format(report: &PublishReport) -> String {
        let rows = report
            .outcomes
            .iter()
            .map(|outcome| {
                let (metric, value, status) = match &outcome.status {
                    SliStatus::Published { metric_name, value } => {
                        (metric_name.as_str(), format!("{:.6}", value), "published".to_string())
                    }
                    SliStatus::DryRun { metric_name, value } => {
                        (metric_name.as_str(), format!("{:.6}", value), "dry run".to_string())
                    }
                    SliStatus::Skipped { reason } => ("-", "-".to_string(), format!("skipped: {}", reason)),
                };
                format!("| {} | {} | {} | {} |", outcome.sli, metric, value, status)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# SLI Publishing Report

## Summary

| Field | Value |
|-------|-------|
| Run ID | {} |
| Namespace | {} |
| Prefix | {} |
| Started | {} |
| Duration | {:?} |
| Published | {} |
| Dry Run | {} |
| Skipped | {} |
| Failed | {} |

## SLIs

| SLI | Metric | Value | Status |
|-----|--------|-------|--------|
{}
"#,
            report.run_id,
            report.namespace,
            report.prefix,
            report.started_at.to_rfc3339(),
            report.duration(),
            report.published_count(),
            report.dry_run_count(),
            report.skipped_count(),
            report.failed_count(),
            rows,
        )
    }
}
