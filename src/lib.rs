pub mod config;
pub mod detect;
pub mod error;
pub mod grade;
pub mod imaging;
pub mod input;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use detect::{BubbleDetector, MarkDetector};
pub use error::{OmrError, OmrResult};
pub use model::{AnswerSheet, Choice, GradeReport, Mark, Status, StudentResult};
pub use pipeline::{GradingSession, SheetInput};
