//! Shared error types for the pipeline core.

use thiserror::Error;

/// Fatal errors raised while forcing pipeline stages.
///
/// The type is `Clone` on purpose: a stage memoizes its failure and every
/// later access replays an equivalent error without re-running the stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The external preprocessor could not be invoked or reported failure.
    #[error("preprocessor `{command}` failed: {message}")]
    Preprocess { command: String, message: String },

    /// A collaborator hit a genuine fault, as opposed to reporting a
    /// document diagnostic.
    #[error("{stage} stage failed: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },

    /// A stage was forced from within its own evaluation.
    #[error("dependency cycle while evaluating stage `{stage}`")]
    DependencyCycle { stage: &'static str },

    /// Wrapped external errors, flattened to a message so the error stays
    /// cloneable for memoized replay.
    #[error("{0}")]
    Internal(String),
}

impl PipelineError {
    /// Create a preprocessing failure for the given command.
    pub fn preprocess(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Preprocess {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a stage fault with the stage name attached.
    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        // Pretty format keeps the context chain in the message.
        Self::Internal(format!("{err:#}"))
    }
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, PipelineError>;
