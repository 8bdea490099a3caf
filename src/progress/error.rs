// src/progress/error.rs

/// Failures surfaced by the progress core.
///
/// These are per-request and recoverable; the HTTP layer decides how to
/// present them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("Invalid module id '{0}'")]
    InvalidModule(String),

    #[error("Module '{0}' has not been started")]
    ModuleNotStarted(String),

    #[error("Question {question_index} of module '{module_id}' has already been answered")]
    DuplicateAnswer { module_id: String, question_index: u32 },

    #[error("Module '{0}' is already completed")]
    ModuleAlreadyCompleted(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
