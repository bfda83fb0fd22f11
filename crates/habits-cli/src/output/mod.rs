//! Output formatting module
//!
//! Table and JSON output for CLI commands, plus the small text helpers the
//! dashboards share.

use serde::Serialize;
use std::fmt::Display;
use tabled::{Table, Tabled};

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {}. Use 'table' or 'json'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Print rows in the specified format
pub fn print_output<T>(data: &[T], format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("No items found.");
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => print_json(data)?,
    }
    Ok(())
}

/// Print a single item in the specified format
pub fn print_single<T>(data: &T, format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    match format {
        OutputFormat::Table => println!("{}", Table::new([data])),
        OutputFormat::Json => print_json(data)?,
    }
    Ok(())
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Boxed section title for dashboard views
pub fn print_heading(title: &str) {
    let width = 62;
    println!("╔{}╗", "═".repeat(width));
    println!("║  {}", title);
    println!("╚{}╝", "═".repeat(width));
    println!();
}

/// `width`-cell bar filled to `ratio` (clamped to 0..=1)
pub fn bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Print a success message (respects quiet mode)
pub fn print_success(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", colored::Colorize::green(message));
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}", colored::Colorize::red(message));
}

/// Print an info message (respects quiet mode)
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", message);
    }
}
