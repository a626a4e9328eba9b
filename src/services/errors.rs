use thiserror::Error;

pub(crate) const COUNT_MISMATCH: &str = "answer count does not match question count";
pub(crate) const INVALID_ANSWER: &str = "all answers must be one of 'a', 'b', 'c' or 'd'";
pub(crate) const NO_ANSWER_KEY: &str = "answer key not found; upload a spreadsheet first";

#[derive(Debug, Error)]
pub(crate) enum QuizError {
    /// The caller sent something unusable: a corrupt workbook, the wrong
    /// number of answers, an answer outside the allowed set.
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    StorageFailure(String),
}

impl QuizError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn storage(err: impl std::fmt::Display, context: &str) -> Self {
        Self::StorageFailure(format!("{context}: {err}"))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            QuizError::InvalidInput(_) => "invalid_input",
            QuizError::NotFound(_) => "not_found",
            QuizError::StorageFailure(_) => "storage_failure",
        }
    }
}
