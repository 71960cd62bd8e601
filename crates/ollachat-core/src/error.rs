use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures produced while obtaining generated text.
///
/// Everything except `Timeout` is recoverable inside the tier chain: the
/// orchestrator logs it and moves on to the next tier. Only the error of the
/// last tier (or a timeout) reaches the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("connectivity probe failed: {0}")]
    Probe(String),

    #[error("streaming generate failed: {0}")]
    Stream(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("timed out after {}s waiting for a response", .0.as_secs())]
    Timeout(Duration),

    #[error("no response received from the model")]
    NoResponse,
}

impl GenerationError {
    /// Whether this error ends the whole generation call instead of
    /// falling through to the next tier.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Could not read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No model selected")]
    NoModel,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ChatError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeout_is_fatal() {
        assert!(GenerationError::Timeout(Duration::from_secs(120)).is_fatal());
        assert!(!GenerationError::NoResponse.is_fatal());
        assert!(!GenerationError::Transport("refused".into()).is_fatal());
        assert!(!GenerationError::Stream("reset".into()).is_fatal());
    }

    #[test]
    fn timeout_message_reports_seconds() {
        let err = GenerationError::Timeout(Duration::from_secs(180));
        assert_eq!(err.to_string(), "timed out after 180s waiting for a response");
    }
}
