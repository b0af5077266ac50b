mod cli;
mod csv;
mod html;
mod json;

pub use cli::{print_cli_table, print_detection_table};
pub use html::print_html;
pub use json::print_json;
pub use self::csv::{generate_csv_string, print_csv, CSV_FILE_NAME};

use crate::model::GradeReport;
use anyhow::Result;

/// Output format for grade reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
    /// CSV spreadsheet export
    Csv,
    /// HTML report format
    Html,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Table => "text/plain; charset=utf-8",
            OutputFormat::Json => "application/json",
            OutputFormat::Csv => "text/csv; charset=utf-8",
            OutputFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', 'csv', or 'html'",
                s
            )),
        }
    }
}

pub fn print_report(report: &GradeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv => print_csv(report),
        OutputFormat::Html => print_html(report),
    }
}

/// Format report to string for file output
pub fn format_report_to_string(report: &GradeReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => generate_csv_string(report),
        OutputFormat::Html => Ok(html::generate_html_string(report)),
        OutputFormat::Table => {
            // For table format, just use JSON as the file output
            Ok(serde_json::to_string_pretty(report)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("html".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_table_file_output_is_json() {
        let report = GradeReport::new(3);
        let text = format_report_to_string(&report, OutputFormat::Table).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["key_questions"], 3);
    }
}
