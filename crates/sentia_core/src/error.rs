use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy of the engine.
///
/// Collaborator failures (`ClassificationUnavailable`, `GenerationTimeout`,
/// `GenerationError`) are recovered inside a turn. `ConfigurationInvalid` is
/// rejected at session start. `RecursionDepthExceeded` is a defect and is
/// never recovered.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("emotion classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("text generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("text generation failed: {0}")]
    GenerationError(String),

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("reflection chain would reach {depth} levels but the maximum is {max}")]
    RecursionDepthExceeded { depth: usize, max: usize },

    #[error("unknown session {0}")]
    SessionNotFound(Uuid),

    #[error("history export failed: {0}")]
    Export(String),
}

impl EngineError {
    /// True for failures of the external collaborators.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            EngineError::ClassificationUnavailable(_)
                | EngineError::GenerationTimeout(_)
                | EngineError::GenerationError(_)
        )
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
