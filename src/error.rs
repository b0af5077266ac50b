use thiserror::Error;

/// Errors raised while scanning and grading answer sheets.
#[derive(Error, Debug)]
pub enum OmrError {
    /// Sheet bytes could not be decoded as an image
    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    /// The answer key produced no detectable answers
    #[error("Failed to detect answers in the answer key. Please check alignment/quality.")]
    EmptyKey,

    /// No answer key was provided
    #[error("Please upload the answer key image first.")]
    MissingKey,

    /// No student sheets were provided
    #[error("Please upload at least one student answer sheet.")]
    NoStudentSheets,

    /// Rejected user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OmrError {
    pub fn decode(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        OmrError::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for OMR operations
pub type OmrResult<T> = Result<T, OmrError>;
