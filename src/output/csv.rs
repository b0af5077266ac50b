//! CSV export of graded results.

use anyhow::Result;
use serde::Serialize;

use crate::model::GradeReport;

/// File name offered for CSV downloads.
pub const CSV_FILE_NAME: &str = "omr_results.csv";

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Student")]
    student: &'a str,
    #[serde(rename = "Total Qs")]
    total: usize,
    #[serde(rename = "Correct")]
    correct: usize,
    #[serde(rename = "Wrong")]
    wrong: usize,
    #[serde(rename = "Blank")]
    blank: usize,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Accuracy (%)")]
    accuracy: f64,
    #[serde(rename = "Status")]
    status: &'static str,
}

/// Renders one CSV row per graded student, with a header row.
pub fn generate_csv_string(report: &GradeReport) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    if report.results.is_empty() {
        writer.write_record([
            "Student",
            "Total Qs",
            "Correct",
            "Wrong",
            "Blank",
            "Score",
            "Accuracy (%)",
            "Status",
        ])?;
    }

    for r in &report.results {
        writer.serialize(CsvRow {
            student: &r.student,
            total: r.total,
            correct: r.correct,
            wrong: r.wrong,
            blank: r.blank,
            score: r.score,
            accuracy: r.accuracy,
            status: r.status.as_str(),
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn print_csv(report: &GradeReport) -> Result<()> {
    print!("{}", generate_csv_string(report)?);
    Ok(())
}
