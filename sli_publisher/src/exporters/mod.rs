pub mod json;
pub mod markdown;
pub mod prometheus;

pub use json::JsonExporter;
pub use markdown::MarkdownExporter;
pub use prometheus::PrometheusExporter;

use crate::report::PublishReport;
use anyhow::Result;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Prometheus,
}

impl ReportFormat {
    pub fn render(&self, report: &PublishReport) -> Result<String> {
        match self {
            ReportFormat::Json => JsonExporter::to_string(report),
            ReportFormat::Markdown => Ok(MarkdownExporter::format(report)),
            ReportFormat::Prometheus => Ok(PrometheusExporter::format(report)),
        }
    }

    pub async fn export(&self, report: &PublishReport, path: impl AsRef<Path>) -> Result<()> {
        let rendered = self.render(report)?;
        tokio::fs::write(path, rendered).await?;
        Ok(())
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "prometheus" | "prom" => Ok(ReportFormat::Prometheus),
            _ => Err(anyhow::anyhow!("Unsupported report format: {}", s)),
        }
    }
}
