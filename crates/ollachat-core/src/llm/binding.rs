use crate::error::GenerationError;
use crate::llm::traits::GenerationRequest;
use ollama_rs::generation::completion::request::GenerationRequest as OllamaGenerationRequest;
use ollama_rs::Ollama;

/// Generation through the `ollama-rs` client library instead of raw HTTP.
///
/// Last line of defence when the hand-rolled transport keeps failing: the
/// library has its own request building and response decoding, so it
/// survives a different set of faults.
#[derive(Debug, Clone)]
pub struct OllamaBinding {
    ollama: Ollama,
}

impl OllamaBinding {
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let ollama = Ollama::try_new(base_url)
            .map_err(|e| GenerationError::Transport(format!("Invalid Ollama URL: {e}")))?;
        Ok(Self { ollama })
    }

    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let models = self
            .ollama
            .list_local_models()
            .await
            .map_err(|e| GenerationError::Transport(format!("Ollama not reachable: {e}")))?;
        Ok(models.into_iter().map(|m| m.name).collect())
    }

    /// Runs the request on its own task, bounded by `request.timeout` for the
    /// whole attempt. The task is aborted when the deadline passes.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let ollama = self.ollama.clone();
        let call = OllamaGenerationRequest::new(request.model.clone(), request.prompt.clone());

        let mut handle = tokio::spawn(async move { ollama.generate(call).await });

        match tokio::time::timeout(request.timeout, &mut handle).await {
            Ok(Ok(Ok(response))) => Ok(response.response),
            Ok(Ok(Err(e))) => Err(GenerationError::Transport(format!(
                "Ollama client error: {e}"
            ))),
            Ok(Err(join_err)) => Err(GenerationError::Transport(format!(
                "Ollama client task failed: {join_err}"
            ))),
            Err(_) => {
                handle.abort();
                Err(GenerationError::Timeout(request.timeout))
            }
        }
    }
}
