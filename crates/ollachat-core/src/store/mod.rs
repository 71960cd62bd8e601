mod db;
mod history;
mod summaries;

pub use db::{timestamp, Database};
pub use history::{ChatHistoryStore, ChatMessage, SessionId};
pub use summaries::{ArtifactStore, FileSummary};
