use crate::detect::Detection;
use crate::model::{GradeReport, Status};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Total Qs")]
    total: usize,
    #[tabled(rename = "Correct")]
    correct: usize,
    #[tabled(rename = "Wrong")]
    wrong: usize,
    #[tabled(rename = "Blank")]
    blank: usize,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Accuracy (%)")]
    accuracy: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "Question")]
    number: u32,
    #[tabled(rename = "Answer")]
    answer: String,
    #[tabled(rename = "Fill")]
    fill: String,
}

pub fn print_cli_table(report: &GradeReport) -> Result<()> {
    println!();
    println!(
        "Graded at: {}",
        report.graded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Answer key questions: {}", report.key_questions);
    println!();

    if report.results.is_empty() {
        println!("No valid student results. Check uploads or OMR detection.");
    } else {
        println!("Graded {} sheets:", report.results.len());
        println!();

        let rows: Vec<ResultRow> = report
            .results
            .iter()
            .map(|r| ResultRow {
                student: truncate(&r.student, 30),
                source: truncate(&r.source, 40),
                total: r.total,
                correct: r.correct,
                wrong: r.wrong,
                blank: r.blank,
                score: format_number(r.score),
                accuracy: format!("{:.2}", r.accuracy),
                status: format_status(r.status),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} sheets:", report.skipped.len());
        println!();

        let rows: Vec<SkippedRow> = report
            .skipped
            .iter()
            .map(|s| SkippedRow {
                student: s.student.clone(),
                source: truncate(&s.source, 40),
                reason: s.reason.clone(),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    println!();
    print_summary(report);

    Ok(())
}

/// Prints the answers read from a single sheet.
pub fn print_detection_table(source: &str, detection: &Detection) -> Result<()> {
    println!();
    println!(
        "{} ({}x{}): {} ink regions, {} bubble candidates, {} questions",
        source,
        detection.width,
        detection.height,
        detection.regions_found,
        detection.candidates.len(),
        detection.questions.len()
    );
    println!();

    if detection.questions.is_empty() {
        println!("No questions detected.");
        return Ok(());
    }

    let rows: Vec<QuestionRow> = detection
        .questions
        .iter()
        .map(|q| QuestionRow {
            number: q.number,
            answer: q
                .mark
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fill: q
                .bubbles
                .iter()
                .map(|b| format!("{:.2}", b.fill))
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

fn format_status(status: Status) -> String {
    match status {
        Status::Pass => "\x1b[32mPASS\x1b[0m".to_string(),
        Status::Fail => "\x1b[31mFAIL\x1b[0m".to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn print_summary(report: &GradeReport) {
    println!("Summary:");
    println!("  Graded: {}", report.results.len());
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", report.skipped.len());
    }
    if !report.results.is_empty() {
        println!(
            "  Passed: {} / Failed: {}",
            report.pass_count(),
            report.fail_count()
        );
        println!("  Average accuracy: {:.2}%", report.average_accuracy());
    }
}
