use thiserror::Error;

/// Failure reported by the external text-generation collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorFailure {
    #[error("rate limited")]
    RateLimited,

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unparsable response: {0}")]
    UnparsableResponse(String),

    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorFailure),

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl AssistError {
    /// Whether this failure is an expected production condition the caller
    /// can surface and let the user retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AssistError::UnparsableResponse(_) | AssistError::Collaborator(_)
        )
    }

    /// Short message suitable for showing to the person typing commands
    pub fn user_message(&self) -> String {
        match self {
            AssistError::UnparsableResponse(_) => {
                "Couldn't understand that change. Try rephrasing it.".into()
            }
            AssistError::Collaborator(CollaboratorFailure::RateLimited) => {
                "The assistant is temporarily rate-limited. Try again in a moment.".into()
            }
            AssistError::Collaborator(CollaboratorFailure::QuotaExceeded) => {
                "The assistant has run out of quota for now.".into()
            }
            AssistError::Collaborator(CollaboratorFailure::InvalidCredential) => {
                "The assistant is not configured with a valid API key.".into()
            }
            AssistError::Collaborator(CollaboratorFailure::Timeout) => {
                "The assistant took too long to respond. Try again.".into()
            }
            AssistError::Collaborator(CollaboratorFailure::Other(_)) => {
                "The assistant is unavailable right now.".into()
            }
            AssistError::UnknownBlockType(block_type) => {
                format!("I don't know how to edit blocks of type '{}'.", block_type)
            }
            other => format!("Something went wrong: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(AssistError::UnparsableResponse("x".into()).is_recoverable());
        assert!(AssistError::Collaborator(CollaboratorFailure::Timeout).is_recoverable());
        assert!(!AssistError::InvalidPath("".into()).is_recoverable());
        assert!(!AssistError::UnknownOperation("nope".into()).is_recoverable());
    }

    #[test]
    fn test_rate_limit_message() {
        let err = AssistError::from(CollaboratorFailure::RateLimited);
        assert!(err.user_message().contains("rate-limited"));
    }
}
