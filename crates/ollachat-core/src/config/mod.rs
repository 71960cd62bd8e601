use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{defaults, endpoints, paths};
use crate::error::ChatError;
use crate::llm::GenerationKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Model used when none is picked interactively.
    pub model: Option<String>,
    pub probe_timeout_secs: u64,
    pub chat_timeout_secs: u64,
    pub summary_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub flush_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub root: PathBuf,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: endpoints::OLLAMA_BASE_URL.to_string(),
            model: None,
            probe_timeout_secs: defaults::PROBE_TIMEOUT_SECS,
            chat_timeout_secs: defaults::CHAT_TIMEOUT_SECS,
            summary_timeout_secs: defaults::SUMMARY_TIMEOUT_SECS,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            flush_threshold: defaults::FLUSH_THRESHOLD,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(defaults::DATABASE_FILE),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl BackendSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Overall timeout for one generation of the given kind.
    pub fn timeout_for(&self, kind: GenerationKind) -> Duration {
        match kind {
            GenerationKind::Chat => Duration::from_secs(self.chat_timeout_secs),
            GenerationKind::Summary => Duration::from_secs(self.summary_timeout_secs),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ChatError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_conventions() {
        let settings = Settings::default();
        assert_eq!(settings.backend.base_url, "http://127.0.0.1:11434");
        assert_eq!(settings.backend.timeout_for(GenerationKind::Chat).as_secs(), 120);
        assert_eq!(settings.backend.timeout_for(GenerationKind::Summary).as_secs(), 180);
        assert_eq!(settings.stream.flush_threshold, 200);
        assert_eq!(settings.output.root, PathBuf::from("out"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: Settings = toml::from_str(
            "[backend]\nmodel = \"llama3\"\nchat_timeout_secs = 30\n",
        )
        .unwrap();
        assert_eq!(parsed.backend.model.as_deref(), Some("llama3"));
        assert_eq!(parsed.backend.chat_timeout_secs, 30);
        assert_eq!(parsed.backend.summary_timeout_secs, 180);
        assert_eq!(parsed.storage.database_path, PathBuf::from("chat_history.db"));
    }
}
