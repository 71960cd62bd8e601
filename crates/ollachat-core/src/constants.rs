/// Ollachat - centralized constants.
/// Endpoints, defaults, and prompt markers live here.

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
    /// Model listing, doubles as the connectivity probe.
    pub const TAGS_PATH: &str = "/api/tags";
    pub const GENERATE_PATH: &str = "/api/generate";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const PROBE_TIMEOUT_SECS: u64 = 10;
    pub const CHAT_TIMEOUT_SECS: u64 = 120;
    pub const SUMMARY_TIMEOUT_SECS: u64 = 180;
    /// Buffered characters that force a flush even without a newline.
    pub const FLUSH_THRESHOLD: usize = 200;
    pub const DATABASE_FILE: &str = "chat_history.db";
    pub const OUTPUT_DIR: &str = "out";
}

// ─── Prompt Markers ───────────────────────────────────────────────────────────

pub mod prompt {
    pub const USER_PROMPT_MARKER: &str = "-- USER PROMPT --";
    pub const SUMMARY_INSTRUCTION: &str = "Please provide a concise summary of this file:";
}

// ─── Resource Limits ──────────────────────────────────────────────────────────

pub mod limits {
    pub const MAX_EXPLORER_ENTRIES: usize = 1000;
    /// Longest error body echoed back from a failed HTTP call.
    pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "ollachat";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const ARTIFACT_SUFFIX: &str = "summary";
    pub const ARTIFACT_EXTENSION: &str = "md";
}
