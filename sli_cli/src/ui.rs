use colored::{ColoredString, Colorize};
use sli_config::SkippedSli;
use std::fmt::Display;

/// Command title, printed once at the top of the output.
pub fn banner(title: &str) {
    println!("{}", format!("=== {} ===", title).bold().cyan());
}

/// Section title underlined to its own width.
pub fn section(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "-".repeat(title.chars().count()).cyan());
}

fn status_line(marker: ColoredString, text: impl Display) {
    println!("{} {}", marker, text);
}

pub fn success(text: impl Display) {
    status_line("✓".green().bold(), text.to_string().green());
}

pub fn failure(text: impl Display) {
    status_line("✗".red().bold(), text.to_string().red());
}

pub fn note(text: impl Display) {
    status_line("ℹ".blue().bold(), text);
}

/// A rejected SLI entry and the field that made it invalid.
pub fn skipped_entry(skipped: &SkippedSli) {
    println!(
        "  {} {}: {}",
        "⚠".yellow().bold(),
        skipped.name.yellow(),
        skipped.error
    );
}
