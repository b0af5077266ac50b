//! Scoring a student sheet against the answer key.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::model::{round2, AnswerSheet, Mark, Status};

/// Per-student counts produced by [`grade_student`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub blank: usize,
    pub score: f64,
    pub accuracy: f64,
    pub status: Status,
}

impl Tally {
    fn empty() -> Self {
        Self {
            total: 0,
            correct: 0,
            wrong: 0,
            blank: 0,
            score: 0.0,
            accuracy: 0.0,
            status: Status::Fail,
        }
    }
}

/// Grades `student` against `key`.
///
/// Every key question is exactly one of correct, wrong or blank. A multiple
/// mark counts as wrong. Questions the key doesn't have are ignored.
///
/// # Example
///
/// ```
/// use omrgrade::config::ScoringConfig;
/// use omrgrade::grade::grade_student;
/// use omrgrade::{AnswerSheet, Choice, Mark};
///
/// let key: AnswerSheet = vec![(1, Mark::Single(Choice::A)), (2, Mark::Single(Choice::B))]
///     .into_iter()
///     .collect();
/// let student: AnswerSheet = vec![(1, Mark::Single(Choice::A))].into_iter().collect();
///
/// let tally = grade_student(&key, &student, &ScoringConfig::default());
/// assert_eq!((tally.correct, tally.wrong, tally.blank), (1, 0, 1));
/// assert_eq!(tally.accuracy, 50.0);
/// ```
pub fn grade_student(key: &AnswerSheet, student: &AnswerSheet, scoring: &ScoringConfig) -> Tally {
    if key.is_empty() {
        return Tally::empty();
    }

    let total = key.len();
    let (mut correct, mut wrong, mut blank) = (0, 0, 0);

    for (question, expected) in key.iter() {
        match (student.get(question), expected) {
            (None, _) => blank += 1,
            (Some(Mark::Single(given)), Mark::Single(answer)) if given == answer => correct += 1,
            _ => wrong += 1,
        }
    }

    let accuracy = round2(correct as f64 / total as f64 * 100.0);
    let score = round2((correct as f64 - scoring.wrong_penalty * wrong as f64).max(0.0));
    let status = if accuracy >= scoring.pass_mark {
        Status::Pass
    } else {
        Status::Fail
    };

    Tally {
        total,
        correct,
        wrong,
        blank,
        score,
        accuracy,
        status,
    }
}
