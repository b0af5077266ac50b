//! Grading sessions: answer key plus a batch of student sheets in,
//! [`GradeReport`] out.
//!
//! Student sheets are decoded and detected on tokio's blocking pool, one
//! task per sheet, unless the session is switched to sequential mode.
//! Results always keep the order the sheets were given in.

use futures::future::join_all;
use image::GrayImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, ScoringConfig};
use crate::detect::{BubbleDetector, MarkDetector};
use crate::error::{OmrError, OmrResult};
use crate::grade::grade_student;
use crate::imaging::decode_sheet;
use crate::model::{AnswerSheet, GradeReport, SkippedSheet, StudentResult};

/// Raw bytes of one uploaded sheet.
#[derive(Debug, Clone)]
pub struct SheetInput {
    pub label: String,
    /// File name the sheet came from
    pub source: String,
    pub bytes: Vec<u8>,
}

impl SheetInput {
    pub fn new(label: impl Into<String>, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            bytes,
        }
    }

    /// Labels sheets `Student 1`, `Student 2`, ... in the given order.
    pub fn numbered(sources: Vec<(String, Vec<u8>)>) -> Vec<Self> {
        sources
            .into_iter()
            .enumerate()
            .map(|(i, (source, bytes))| Self::new(format!("Student {}", i + 1), source, bytes))
            .collect()
    }
}

type ProgressFn = dyn Fn(&str) + Send + Sync;

enum Outcome {
    Graded(StudentResult),
    Skipped(SkippedSheet),
}

/// Runs the detector over a key and student sheets and grades them.
pub struct GradingSession {
    detector: Arc<dyn MarkDetector>,
    scoring: ScoringConfig,
    parallel: bool,
    progress: Option<Arc<ProgressFn>>,
}

impl GradingSession {
    pub fn new(config: &Config) -> Self {
        Self::with_detector(
            Arc::new(BubbleDetector::new(config.detection.clone())),
            config.scoring.clone(),
        )
    }

    pub fn with_detector(detector: Arc<dyn MarkDetector>, scoring: ScoringConfig) -> Self {
        Self {
            detector,
            scoring,
            parallel: true,
            progress: None,
        }
    }

    /// Processes student sheets one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Called with the sheet label each time a student sheet finishes.
    pub fn with_progress(mut self, progress: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Detects the answer key, then grades every student sheet.
    ///
    /// Unreadable student sheets are recorded in [`GradeReport::skipped`]
    /// rather than failing the session.
    ///
    /// # Errors
    ///
    /// - [`OmrError::NoStudentSheets`] if `students` is empty
    /// - [`OmrError::Decode`] if the key cannot be decoded
    /// - [`OmrError::EmptyKey`] if no answers are found on the key
    pub async fn run(&self, key: SheetInput, students: Vec<SheetInput>) -> OmrResult<GradeReport> {
        let mut debug_log = vec![
            format!("Answer key bytes: {}", key.bytes.len()),
            format!("Student papers count: {}", students.len()),
        ];

        if students.is_empty() {
            return Err(OmrError::NoStudentSheets);
        }

        let detector = Arc::clone(&self.detector);
        let key_sheet = run_blocking(move || read_key(detector.as_ref(), &key.bytes)).await??;

        debug_log.push(format!("Key answers detected: {}", key_sheet.len()));
        info!(
            questions = key_sheet.len(),
            students = students.len(),
            detector = self.detector.name(),
            "grading session started"
        );

        let key_sheet = Arc::new(key_sheet);
        let outcomes = if self.parallel && students.len() > 1 {
            let futures = students
                .into_iter()
                .map(|student| self.grade_one(Arc::clone(&key_sheet), student));
            join_all(futures).await
        } else {
            let mut outcomes = Vec::with_capacity(students.len());
            for student in students {
                outcomes.push(self.grade_one(Arc::clone(&key_sheet), student).await);
            }
            outcomes
        };

        let mut report = GradeReport::new(key_sheet.len());
        report.debug = debug_log;
        for outcome in outcomes {
            match outcome {
                Outcome::Graded(result) => report.results.push(result),
                Outcome::Skipped(skipped) => {
                    report.log(format!("{}: {}.", skipped.student, skipped.reason));
                    report.skipped.push(skipped);
                }
            }
        }

        info!(
            graded = report.results.len(),
            skipped = report.skipped.len(),
            "grading session finished"
        );
        Ok(report)
    }

    async fn grade_one(&self, key: Arc<AnswerSheet>, student: SheetInput) -> Outcome {
        let label = student.label.clone();
        let source = student.source.clone();
        let detector = Arc::clone(&self.detector);
        let scoring = self.scoring.clone();

        let graded =
            run_blocking(move || grade_sheet(detector.as_ref(), &key, &scoring, student)).await;
        let outcome = match graded {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Skipped(SkippedSheet {
                student: label.clone(),
                source,
                reason: e.to_string(),
            }),
        };

        if let Some(progress) = &self.progress {
            progress(&label);
        }
        outcome
    }
}

async fn run_blocking<T, F>(f: F) -> OmrResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| OmrError::InvalidInput(format!("sheet worker failed: {}", e)))
}

fn read_key(detector: &dyn MarkDetector, bytes: &[u8]) -> OmrResult<AnswerSheet> {
    let gray = decode_sheet(bytes).map_err(|e| match e {
        OmrError::Decode { message, .. } => OmrError::decode("answer key", message),
        other => other,
    })?;

    let sheet = detector.detect(&gray).sheet;
    if sheet.is_empty() {
        return Err(OmrError::EmptyKey);
    }
    Ok(sheet)
}

fn grade_sheet(
    detector: &dyn MarkDetector,
    key: &AnswerSheet,
    scoring: &ScoringConfig,
    student: SheetInput,
) -> Outcome {
    let skip = |reason: &str| {
        warn!(student = %student.label, source = %student.source, reason, "skipping sheet");
        Outcome::Skipped(SkippedSheet {
            student: student.label.clone(),
            source: student.source.clone(),
            reason: reason.to_string(),
        })
    };

    let gray: GrayImage = match decode_sheet(&student.bytes) {
        Ok(gray) => gray,
        Err(_) => return skip("decode failed"),
    };

    let answers = detector.detect(&gray).sheet;
    if answers.is_empty() {
        return skip("OMR detection returned empty");
    }

    let tally = grade_student(key, &answers, scoring);
    debug!(
        student = %student.label,
        correct = tally.correct,
        wrong = tally.wrong,
        blank = tally.blank,
        "graded sheet"
    );

    Outcome::Graded(StudentResult {
        student: student.label.clone(),
        source: student.source.clone(),
        total: tally.total,
        correct: tally.correct,
        wrong: tally.wrong,
        blank: tally.blank,
        score: tally.score,
        accuracy: tally.accuracy,
        status: tally.status,
    })
}
