use crate::report::PublishReport;

/// Text exposition of a publishing run, for a node-exporter textfile
/// collector or a pushgateway.
pub struct PrometheusExporter;

impl PrometheusExporter {
    pub fn format(report: &PublishReport) -> String {
        let mut out = String::from(
            "# HELP sli_ratio Computed SLI ratio over its trailing window\n# TYPE sli_ratio gauge\n",
        );
        for outcome in &report.outcomes {
            if let (Some(metric), Some(value)) = (outcome.metric_name(), outcome.value()) {
                out.push_str(&format!(
                    "sli_ratio{{sli=\"{}\",metric=\"{}\"}} {}\n",
                    escape_label(&outcome.sli),
                    escape_label(metric),
                    value
                ));
            }
        }

        out.push_str(&format!(
            r#"
# HELP sli_publish_published SLIs written in the last run
# TYPE sli_publish_published gauge
sli_publish_published {}

# HELP sli_publish_skipped SLIs skipped in the last run
# TYPE sli_publish_skipped gauge
sli_publish_skipped {}

# HELP sli_publish_failed SLIs skipped because of a backend error in the last run
# TYPE sli_publish_failed gauge
sli_publish_failed {}

# HELP sli_publish_duration_seconds Wall time of the last run
# TYPE sli_publish_duration_seconds gauge
sli_publish_duration_seconds {}
"#,
            report.published_count(),
            report.skipped_count(),
            report.failed_count(),
            report.duration().as_secs_f64(),
        ));
        out
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
