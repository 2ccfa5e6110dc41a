use crate::ui;
use crate::ValidateArgs;
use anyhow::{Context, Result};
use colored::Colorize;
use sli_config::SliParser;

pub async fn execute(args: ValidateArgs) -> Result<()> {
    let source = args.slis.source();
    ui::banner("Validating SLI Definitions");
    println!("Source: {}", source.describe());
    println!("Default window: {} days", args.window_days);

    let parser = SliParser::new(args.window_days)?;
    let parsed = parser
        .parse_source(&source)
        .await
        .with_context(|| format!("Failed to load SLI definitions from {}", source.describe()))?;

    ui::section(&format!("Valid SLIs ({})", parsed.slis.len()));
    for sli in &parsed.slis {
        println!(
            "  {} window {} days, {} numerator / {} denominator metrics",
            sli.name().green(),
            sli.window_days(),
            sli.numerator().len(),
            sli.denominator().len()
        );
        for query in sli.numerator().queries().iter().chain(sli.denominator().queries()) {
            let spec = query.spec();
            println!(
                "      {} [{}] x{}",
                spec.qualified_name(),
                spec.reducer.name(),
                spec.multiplier
            );
        }
    }

    if parsed.is_clean() {
        println!();
        ui::success("All SLI definitions are valid");
        return Ok(());
    }

    ui::section(&format!("Skipped SLIs ({})", parsed.skipped.len()));
    for skipped in &parsed.skipped {
        ui::skipped_entry(skipped);
    }

    println!();
    ui::failure("Some SLI definitions are malformed");
    anyhow::bail!("{} malformed SLI definition(s)", parsed.skipped.len())
}
