use crate::report::PublishReport;
use anyhow::Result;

pub struct JsonExporter;

impl JsonExporter {
    pub fn to_string(report: &PublishReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
