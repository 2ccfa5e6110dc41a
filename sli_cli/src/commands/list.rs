use crate::ui;
use anyhow::Result;
use colored::Colorize;
use sli_core::Statistic;

pub async fn execute() -> Result<()> {
    ui::banner("Standard Statistics");

    for statistic in Statistic::ALL {
        println!("  {} {}", "•".green(), statistic);
    }

    println!(
        "\n{}",
        "Percentile reducers (e.g. p99, p99.9, tm90) go in extended_statistic".yellow()
    );
    println!("{}", "Omitting both statistic fields reduces with Sum".yellow());

    Ok(())
}
