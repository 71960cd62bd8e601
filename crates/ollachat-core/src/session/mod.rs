use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::Settings;
use crate::context::{ContextSelection, PromptComposer};
use crate::error::{ChatError, Result};
use crate::llm::{
    EventSender, GenerationEvent, GenerationKind, GenerationRequest, OllamaBinding, OllamaHttp,
    Role,
};
use crate::orchestrator::GenerationOrchestrator;
use crate::output::{write_artifact, Artifact, OutputSink};
use crate::project::{list_entries, ExplorerEntry};
use crate::store::{ArtifactStore, ChatHistoryStore, Database, SessionId};

/// State changes pushed to the notify hook, each carrying the new value.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Model(String),
    Loading(bool),
    Selection(Option<PathBuf>),
    Context(Vec<PathBuf>),
    OutputRoot(PathBuf),
    Artifact(Artifact),
}

pub type NotifyHook = Arc<dyn Fn(&SessionChange) + Send + Sync>;

struct SessionState {
    model: Option<String>,
    selected: Option<PathBuf>,
    context: ContextSelection,
    artifact: Option<Artifact>,
    sink: OutputSink,
}

/// Front-end facing controller: one per process, one session id.
///
/// Every command of the front end (submit, select, add/clear context,
/// summarize, save, change root, refresh) maps to a method here. Blocking
/// work runs on the blocking pool; generation goes through the
/// orchestrator. The loading indicator is advisory only: concurrent calls
/// are neither queued nor rejected.
pub struct ChatSession {
    session_id: SessionId,
    settings: Settings,
    orchestrator: GenerationOrchestrator,
    history: ChatHistoryStore,
    summaries: ArtifactStore,
    state: Mutex<SessionState>,
    in_flight: AtomicUsize,
    notify: Option<NotifyHook>,
    working_dir: PathBuf,
}

/// Decrements the in-flight counter when a generation ends, however it ends.
struct LoadingGuard<'a> {
    session: &'a ChatSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.session.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.session.emit(SessionChange::Loading(false));
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ChatError::Other(format!("Background task failed: {e}")))?
}

impl ChatSession {
    pub fn new(settings: Settings, orchestrator: GenerationOrchestrator, db: Arc<Database>) -> Self {
        let sink = OutputSink::new(settings.output.root.clone());
        let model = settings.backend.model.clone();
        Self {
            session_id: SessionId::new(),
            orchestrator,
            history: ChatHistoryStore::new(db.clone()),
            summaries: ArtifactStore::new(db),
            state: Mutex::new(SessionState {
                model,
                selected: None,
                context: ContextSelection::new(),
                artifact: None,
                sink,
            }),
            in_flight: AtomicUsize::new(0),
            notify: None,
            working_dir: PathBuf::from("."),
            settings,
        }
    }

    /// Open the configured database and build the default tier chain.
    pub fn open(settings: Settings) -> Result<Self> {
        let db = Arc::new(Database::open(&settings.storage.database_path)?);
        let orchestrator = GenerationOrchestrator::from_settings(&settings)?;
        Ok(Self::new(settings, orchestrator, db))
    }

    pub fn with_notify(mut self, hook: NotifyHook) -> Self {
        self.notify = Some(hook);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_session_id(mut self, id: SessionId) -> Self {
        self.session_id = id;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn history_store(&self) -> &ChatHistoryStore {
        &self.history
    }

    pub fn artifact_store(&self) -> &ArtifactStore {
        &self.summaries
    }

    fn emit(&self, change: SessionChange) {
        if let Some(ref hook) = self.notify {
            hook(&change);
        }
    }

    fn loading(&self) -> LoadingGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.emit(SessionChange::Loading(true));
        }
        LoadingGuard { session: self }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // ── Model ───────────────────────────────────────────────────────────

    pub fn model(&self) -> Option<String> {
        self.state.lock().model.clone()
    }

    pub fn set_model(&self, model: impl Into<String>) -> String {
        let model = model.into();
        self.state.lock().model = Some(model.clone());
        self.emit(SessionChange::Model(model.clone()));
        model
    }

    fn require_model(&self) -> Result<String> {
        self.model().ok_or(ChatError::NoModel)
    }

    /// Models known to the backend, via HTTP first and the client library
    /// second.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let http = OllamaHttp::new(self.settings.backend.base_url.clone())
            .with_probe_timeout(self.settings.backend.probe_timeout());
        match http.list_models().await {
            Ok(models) => Ok(models),
            Err(e) => {
                tracing::info!("HTTP model listing failed: {e}; trying Ollama client");
                let binding = OllamaBinding::new(&self.settings.backend.base_url)?;
                Ok(binding.list_models().await?)
            }
        }
    }

    // ── File selection and context ─────────────────────────────────────

    pub fn select_file(&self, path: impl Into<PathBuf>) -> Option<PathBuf> {
        let path = Some(path.into());
        self.state.lock().selected = path.clone();
        self.emit(SessionChange::Selection(path.clone()));
        path
    }

    pub fn selected_file(&self) -> Option<PathBuf> {
        self.state.lock().selected.clone()
    }

    /// Add the selected file to the context. False when nothing is selected
    /// or the file is already included.
    pub fn add_to_context(&self) -> bool {
        match self.selected_file() {
            Some(path) => self.add_path_to_context(path),
            None => false,
        }
    }

    pub fn add_path_to_context(&self, path: impl Into<PathBuf>) -> bool {
        let files = {
            let mut state = self.state.lock();
            if !state.context.add(path) {
                return false;
            }
            state.context.files().to_vec()
        };
        self.emit(SessionChange::Context(files));
        true
    }

    pub fn clear_context(&self) {
        self.state.lock().context.clear();
        self.emit(SessionChange::Context(Vec::new()));
    }

    pub fn context_files(&self) -> Vec<PathBuf> {
        self.state.lock().context.files().to_vec()
    }

    // ── Conversation ───────────────────────────────────────────────────

    /// Messages already stored for this session, oldest first.
    pub async fn history(&self) -> Result<Vec<(Role, String)>> {
        let store = self.history.clone();
        let session = self.session_id.clone();
        run_blocking(move || store.get(&session)).await
    }

    /// Send one chat turn: persist the user message, compose the prompt
    /// with the context files, run the tier chain, persist the reply.
    ///
    /// Store failures are reported as `Warning` events and never fail the
    /// turn.
    pub async fn submit_message(&self, message: &str, events: &EventSender) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Other("Message is empty".into()));
        }
        let model = self.require_model()?;
        let _loading = self.loading();

        self.persist_message(&model, Role::User, message, events).await;

        let files = self.context_files();
        let owned = message.to_string();
        let prompt = run_blocking(move || Ok(PromptComposer::compose(&owned, &files))).await?;

        let request = GenerationRequest::new(
            prompt,
            model.clone(),
            GenerationKind::Chat,
            self.settings.backend.timeout_for(GenerationKind::Chat),
        );
        let text = self.orchestrator.generate(&request, events).await?;

        self.persist_message(&model, Role::Assistant, &text, events).await;
        self.set_artifact(Artifact::new("chat", text.clone()));
        Ok(text)
    }

    async fn persist_message(&self, model: &str, role: Role, content: &str, events: &EventSender) {
        let store = self.history.clone();
        let session = self.session_id.clone();
        let model = model.to_string();
        let content = content.to_string();

        let result =
            run_blocking(move || store.append(&session, &model, role, &content).map(|_| ())).await;
        if let Err(e) = result {
            tracing::warn!("Failed to store {role} message: {e}");
            let _ = events.send(GenerationEvent::Warning(format!(
                "DB error ({role} message): {e}"
            )));
        }
    }

    // ── Summaries and artifacts ────────────────────────────────────────

    pub async fn summarize_selected(&self, events: &EventSender) -> Result<String> {
        let path = self
            .selected_file()
            .ok_or_else(|| ChatError::Other("No file selected".into()))?;
        self.summarize_file(&path, events).await
    }

    /// Summarize one file and upsert the result under `(path, model)`.
    /// An unreadable target fails this request only.
    pub async fn summarize_file(&self, path: &Path, events: &EventSender) -> Result<String> {
        let model = self.require_model()?;

        let target = path.to_path_buf();
        let content = match run_blocking(move || {
            std::fs::read_to_string(&target).map_err(|e| ChatError::file_read(target.clone(), e))
        })
        .await
        {
            Ok(content) => content,
            Err(ChatError::FileRead { path, source }) => {
                tracing::warn!("Cannot summarize {}: {source}", path.display());
                let _ = events.send(GenerationEvent::ReadFailed {
                    path: path.clone(),
                    reason: source.to_string(),
                });
                return Err(ChatError::FileRead { path, source });
            }
            Err(e) => return Err(e),
        };

        let _loading = self.loading();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let _ = events.send(GenerationEvent::Info(format!(
            "Summarizing '{name}' with model '{model}'..."
        )));

        let request = GenerationRequest::new(
            PromptComposer::summary_prompt(path, &content),
            model.clone(),
            GenerationKind::Summary,
            self.settings.backend.timeout_for(GenerationKind::Summary),
        );
        let summary = self.orchestrator.generate(&request, events).await?;

        let store = self.summaries.clone();
        let key = path.display().to_string();
        let stored = summary.clone();
        let upsert_model = model.clone();
        if let Err(e) = run_blocking(move || store.upsert(&key, &upsert_model, &stored)).await {
            tracing::warn!("Failed to store summary for {}: {e}", path.display());
            let _ = events.send(GenerationEvent::Warning(format!("DB error (summary): {e}")));
        }

        self.set_artifact(Artifact::new(name, summary.clone()));
        Ok(summary)
    }

    fn set_artifact(&self, artifact: Artifact) {
        self.state.lock().artifact = Some(artifact.clone());
        self.emit(SessionChange::Artifact(artifact));
    }

    pub fn current_artifact(&self) -> Option<Artifact> {
        self.state.lock().artifact.clone()
    }

    /// Save the latest artifact under the output root. `None` when there
    /// is nothing to save yet.
    pub async fn save_artifact(&self) -> Result<Option<PathBuf>> {
        let (artifact, root) = {
            let state = self.state.lock();
            match state.artifact.clone() {
                Some(artifact) => (artifact, state.sink.root().to_path_buf()),
                None => return Ok(None),
            }
        };

        let path = run_blocking(move || write_artifact(&root, &artifact, chrono::Local::now())).await?;
        self.state.lock().sink.record(path.clone());
        Ok(Some(path))
    }

    pub fn output_root(&self) -> PathBuf {
        self.state.lock().sink.root().to_path_buf()
    }

    pub fn change_output_root(&self, root: impl Into<PathBuf>) -> PathBuf {
        let root = self.state.lock().sink.set_root(root).to_path_buf();
        self.emit(SessionChange::OutputRoot(root.clone()));
        root
    }

    pub fn recent_artifacts(&self) -> Vec<PathBuf> {
        self.state.lock().sink.recents().to_vec()
    }

    // ── Explorer ───────────────────────────────────────────────────────

    pub async fn refresh_explorer(&self, recursive: bool) -> Result<Vec<ExplorerEntry>> {
        let root = self.working_dir.clone();
        run_blocking(move || Ok(list_entries(&root, recursive))).await
    }
}
