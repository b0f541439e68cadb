//! Output formatting for CLI

use autotest_common::{ReportRow, Status, TestCase};
use autotest_engine::{RecordingSummary, ReplaySummary};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table<T: TableDisplay>() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(T::headers());
    table
}

fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value).unwrap_or_default()),
        OutputFormat::Table => {}
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = table::<T>();
            table.add_row(item.row());
            println!("{table}");
        }
        _ => print_serialized(item, format),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
                return;
            }
            let mut table = table::<T>();
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        _ => print_serialized(items, format),
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

fn status_cell(status: Status) -> String {
    match status {
        Status::Pass => "✓ Pass".green().to_string(),
        Status::Fail => "✗ Fail".red().to_string(),
    }
}

/// Stored test case with its position in the profile
#[derive(Serialize)]
pub struct CaseDisplay<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub case: &'a TestCase,
}

impl TableDisplay for CaseDisplay<'_> {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Action", "URL", "Element XPath", "Expected Output"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.case.action().to_string(),
            self.case.url().to_string(),
            self.case.locator().map(|l| l.to_string()).unwrap_or_else(|| "N/A".to_string()),
            self.case.expected_output().to_string(),
        ]
    }
}

impl TableDisplay for ReportRow {
    fn headers() -> Vec<&'static str> {
        vec!["Date", "Time", "Element XPath", "Action", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.time.format("%H:%M:%S").to_string(),
            self.locator_or_na().to_string(),
            self.action.to_string(),
            status_cell(self.status),
        ]
    }
}

impl TableDisplay for RecordingSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Site", "URL", "Clickable", "Added", "Skipped", "Total Cases"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.site_name.clone(),
            self.url.clone(),
            self.elements_found.to_string(),
            self.cases_added.to_string(),
            self.elements_skipped.to_string(),
            self.total_cases.to_string(),
        ]
    }
}

impl TableDisplay for ReplaySummary {
    fn headers() -> Vec<&'static str> {
        vec!["Site", "Total", "Passed", "Failed", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        let failed = if self.failed > 0 {
            self.failed.to_string().red().to_string()
        } else {
            self.failed.to_string()
        };
        vec![
            self.site_name.clone(),
            self.total.to_string(),
            self.passed.to_string().green().to_string(),
            failed,
            format!("{:.1}s", self.duration_ms as f64 / 1000.0),
        ]
    }
}
