//! Error types for qcm.
//!
//! Every fallible library operation returns [`QcmError`]. The variants follow
//! the failure classes a caller needs to tell apart: a missing lesson is shown
//! to the user, a malformed lesson is skipped, and a failed write is logged
//! without interrupting the quiz.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by loading, sampling, quizzing and persisting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QcmError {
    /// The requested module or lesson does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A lesson file is not a JSON array of well-formed questions.
    #[error("malformed data in {source_name}: {reason}")]
    MalformedData { source_name: String, reason: String },

    /// An exam asked for more questions than the module can supply.
    #[error("exam needs {requested} questions but only {available} are available")]
    InsufficientQuestions { requested: usize, available: usize },

    /// Writing a lesson or the statistics file failed.
    #[error("failed to write {path}: {source}")]
    PersistenceWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A session or exam would contain no questions.
    #[error("no questions available for {0}")]
    EmptyBank(String),

    /// A position outside `0..len` was addressed.
    #[error("position {position} is out of range (session has {len} questions)")]
    PositionOutOfRange { position: usize, len: usize },

    /// A selected choice index does not exist on the question.
    #[error("choice {choice} does not exist (question has {choices} choices)")]
    InvalidChoice { choice: usize, choices: usize },

    /// The session is finished and no longer accepts answers.
    #[error("session is already finished")]
    SessionFinished,

    /// An authored question failed validation.
    #[error("invalid question: {0}")]
    InvalidDraft(String),

    /// A module or lesson name cannot be used as a path component.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

impl QcmError {
    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        QcmError::MalformedData {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QcmError::PersistenceWriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for write failures, which callers log and move past.
    pub fn is_persistence(&self) -> bool {
        matches!(self, QcmError::PersistenceWriteFailure { .. })
    }

    /// Returns `true` if the error means the requested item does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QcmError::NotFound(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QcmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_errors_are_classified() {
        let err = QcmError::write_failure(
            "stats.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_persistence());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("stats.json"));
    }

    #[test]
    fn malformed_message_names_source() {
        let err = QcmError::malformed("Biochemistry/enzymes", "expected an array");
        assert_eq!(
            err.to_string(),
            "malformed data in Biochemistry/enzymes: expected an array"
        );
    }
}
