use crate::ui;
use crate::RunArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use sli_config::SliParser;
use sli_core::{
    DatapointPolicy, DynBackend, HttpBackend, HttpBackendConfig, InMemoryBackend, MetricsBackend,
};
use sli_publisher::{PublishReport, Publisher, ReportFormat, SliStatus};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "SLI")]
    sli: String,
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    ui::banner("SLI Publisher");

    let source = args.slis.source();
    let policy = if args.strict_datapoints {
        DatapointPolicy::ExactlyOne
    } else {
        DatapointPolicy::SumAll
    };

    let parser = SliParser::new(args.window_days)?.policy(policy);
    let parsed = parser
        .parse_source(&source)
        .await
        .with_context(|| format!("Failed to load SLI definitions from {}", source.describe()))?;

    println!("Namespace: {}", args.namespace.green());
    println!("Prefix: {}", args.prefix.green());
    println!("Default window: {} days", args.window_days);
    println!("SLIs: {} valid, {} skipped", parsed.slis.len(), parsed.skipped.len());
    for skipped in &parsed.skipped {
        ui::skipped_entry(skipped);
    }

    let backend = build_backend(&args).await?;
    info!("Using {} backend", backend.name());

    let publisher = Publisher::new(backend).dry_run(args.dry_run);
    let report = publisher
        .publish(&parsed.slis, &args.namespace, &args.prefix)
        .await?;

    print_report(&report);

    if let Some(path) = &args.report {
        let format = ReportFormat::from(args.report_format);
        format
            .export(&report, path)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        ui::note(format!("Report written to {}", path.display()));
    }

    Ok(())
}

async fn build_backend(args: &RunArgs) -> Result<DynBackend> {
    if let Some(path) = &args.backend.fixture {
        let backend = InMemoryBackend::from_fixture_file(path)
            .await
            .with_context(|| format!("Failed to load fixture {}", path.display()))?;
        return Ok(Arc::new(backend));
    }

    if let Some(url) = &args.backend.backend_url {
        let mut config = HttpBackendConfig::new(url.as_str()).timeout(args.timeout);
        if let Some(token) = &args.backend_token {
            config = config.token(token.as_str());
        }
        return Ok(Arc::new(HttpBackend::new(config)?));
    }

    anyhow::bail!("Must specify either --backend-url or --fixture")
}

fn print_report(report: &PublishReport) {
    let rows: Vec<OutcomeRow> = report
        .outcomes
        .iter()
        .map(|outcome| {
            let (metric, value, status) = match &outcome.status {
                SliStatus::Published { metric_name, value } => {
                    (metric_name.clone(), format!("{:.6}", value), "published".to_string())
                }
                SliStatus::DryRun { metric_name, value } => {
                    (metric_name.clone(), format!("{:.6}", value), "dry run".to_string())
                }
                SliStatus::Skipped { reason } => {
                    ("-".to_string(), "-".to_string(), format!("skipped: {}", reason))
                }
            };
            OutcomeRow {
                sli: outcome.sli.clone(),
                metric,
                value,
                status,
            }
        })
        .collect();

    ui::section("Results");
    if rows.is_empty() {
        println!("No SLIs to publish");
    } else {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    println!(
        "\nPublished: {}  Dry run: {}  Skipped: {}  Failed: {}",
        report.published_count(),
        report.dry_run_count(),
        report.skipped_count(),
        report.failed_count()
    );
    println!("Run ID: {}", report.run_id);
    println!(
        "Duration: {}",
        humantime::format_duration(report.duration())
    );

    if report.failed_count() > 0 {
        ui::failure("Some SLIs failed; see the log for backend errors");
    } else {
        ui::success("Publishing run completed");
    }
}
