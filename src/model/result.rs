use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "Pass",
            Status::Fail => "Fail",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Graded outcome for one student sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    pub student: String,
    pub source: String,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub blank: usize,
    pub score: f64,
    /// Percentage of key questions answered correctly, two decimals
    pub accuracy: f64,
    pub status: Status,
}

/// A student sheet that could not be graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSheet {
    pub student: String,
    pub source: String,
    pub reason: String,
}

/// Results of one grading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub graded_at: DateTime<Utc>,
    pub key_questions: usize,
    pub results: Vec<StudentResult>,
    pub skipped: Vec<SkippedSheet>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub debug: Vec<String>,
}

impl GradeReport {
    pub fn new(key_questions: usize) -> Self {
        Self {
            graded_at: Utc::now(),
            key_questions,
            results: Vec::new(),
            skipped: Vec::new(),
            debug: Vec::new(),
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.debug.push(line.into());
    }

    pub fn pass_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == Status::Pass)
            .count()
    }

    pub fn fail_count(&self) -> usize {
        self.results.len() - self.pass_count()
    }

    /// Mean accuracy across graded students, or 0 when nothing was graded.
    pub fn average_accuracy(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.results.iter().map(|r| r.accuracy).sum();
        round2(sum / self.results.len() as f64)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(accuracy: f64, status: Status) -> StudentResult {
        StudentResult {
            student: "Student 1".to_string(),
            source: "a.png".to_string(),
            total: 10,
            correct: 0,
            wrong: 0,
            blank: 0,
            score: 0.0,
            accuracy,
            status,
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = GradeReport::new(10);
        report.results.push(result(90.0, Status::Pass));
        report.results.push(result(20.0, Status::Fail));
        report.results.push(result(55.5, Status::Pass));

        assert_eq!(report.pass_count(), 2);
        assert_eq!(report.fail_count(), 1);
        assert_eq!(report.average_accuracy(), 55.17);
    }

    #[test]
    fn test_empty_report_average() {
        let report = GradeReport::new(0);
        assert_eq!(report.average_accuracy(), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(12.0), 12.0);
    }
}
