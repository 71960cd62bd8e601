pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod output;
pub mod project;
pub mod session;
pub mod store;

// Re-export key types
pub use config::Settings;
pub use context::{ContextSelection, PromptComposer};
pub use error::{ChatError, GenerationError};
pub use llm::{EventSender, GenerationEvent, GenerationKind, GenerationRequest, Role};
pub use orchestrator::{GenerationOrchestrator, Tier};
pub use output::{Artifact, OutputSink};
pub use session::{ChatSession, SessionChange};
pub use store::{ArtifactStore, ChatHistoryStore, Database, SessionId};
