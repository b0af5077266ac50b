//! Core data types for answer sheets and grading results.
//!
//! - [`Choice`] - A single answer option (A to E)
//! - [`Mark`] - What was filled in on one question
//! - [`AnswerSheet`] - All marks read from one sheet
//! - [`StudentResult`] - Graded outcome for a student
//! - [`GradeReport`] - Complete grading session output
//!
//! # Example
//!
//! ```
//! use omrgrade::{AnswerSheet, Choice, Mark};
//!
//! let mut key = AnswerSheet::new();
//! key.insert(1, Mark::Single(Choice::B));
//!
//! println!("Key has {} questions", key.len());
//! ```

mod result;
mod sheet;

pub use result::*;
pub use sheet::*;
