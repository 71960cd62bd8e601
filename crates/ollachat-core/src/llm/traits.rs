use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn from_str_opt(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a generation is for. Decides the timeout budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Chat,
    Summary,
}

/// One orchestration call. Lives only as long as the call itself.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub kind: GenerationKind,
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        model: impl Into<String>,
        kind: GenerationKind,
        timeout: Duration,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            kind,
            timeout,
        }
    }
}

/// Events emitted while a generation runs - the shared core/front-end interface.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// Tier transitions, probe warnings, progress notes.
    Info(String),
    /// Flushed chunk of streamed text.
    Fragment(String),
    /// Terminal success carrying the complete text.
    Done(String),
    /// Terminal failure.
    Error(GenerationError),
    /// Secondary problem that does not invalidate delivered text.
    Warning(String),
    /// A summarization target could not be read; nothing was generated.
    ReadFailed { path: PathBuf, reason: String },
}

pub type EventSender = tokio::sync::mpsc::UnboundedSender<GenerationEvent>;

/// Line of an `/api/generate` response, streamed or not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
