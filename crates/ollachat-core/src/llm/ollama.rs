use crate::constants::{endpoints, limits};
use crate::error::GenerationError;
use crate::llm::stream::{FlushBuffer, NdjsonDecoder};
use crate::llm::traits::*;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw HTTP client for the Ollama REST surface (`/api/tags`, `/api/generate`).
#[derive(Debug, Clone)]
pub struct OllamaHttp {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaHttp {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout: Duration::from_secs(crate::constants::defaults::PROBE_TIMEOUT_SECS),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Connectivity check against the model-listing endpoint. Any 200 counts.
    pub async fn probe(&self) -> Result<(), GenerationError> {
        let response = self
            .client
            .get(self.url(endpoints::TAGS_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| GenerationError::Probe(format!("could not reach backend: {e}")))?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Probe(format!(
                "{} returned {}: {}",
                endpoints::TAGS_PATH,
                status,
                preview(&body)
            )));
        }
        Ok(())
    }

    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let response = self
            .client
            .get(self.url(endpoints::TAGS_PATH))
            .timeout(self.probe_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::Transport(format!(
                "{} returned {}",
                endpoints::TAGS_PATH,
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Streaming generate. Flushed text goes out as `Fragment` events; the
    /// full concatenation is returned once a `done` record arrives or the
    /// body closes.
    pub async fn generate_stream(
        &self,
        request: &GenerationRequest,
        flush_threshold: usize,
        events: &EventSender,
    ) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url(endpoints::GENERATE_PATH))
            .timeout(request.timeout)
            .json(&GenerateBody {
                model: &request.model,
                prompt: &request.prompt,
                stream: true,
            })
            .send()
            .await
            .map_err(|e| GenerationError::Stream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Stream(format!(
                "generate returned {}: {}",
                status,
                preview(&body)
            )));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = NdjsonDecoder::new();
        let mut buffer = FlushBuffer::new(flush_threshold);

        'read: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| GenerationError::Stream(e.to_string()))?;
            for record in decoder.push(&chunk) {
                if let Some(text) = buffer.push(&record.response) {
                    let _ = events.send(GenerationEvent::Fragment(text));
                }
                if record.done {
                    break 'read;
                }
            }
        }

        if let Some(record) = decoder.finish() {
            if let Some(text) = buffer.push(&record.response) {
                let _ = events.send(GenerationEvent::Fragment(text));
            }
        }
        if let Some(text) = buffer.finish() {
            let _ = events.send(GenerationEvent::Fragment(text));
        }

        Ok(buffer.into_text())
    }

    /// Single request/response generate.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url(endpoints::GENERATE_PATH))
            .timeout(request.timeout)
            .json(&GenerateBody {
                model: &request.model,
                prompt: &request.prompt,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport(format!(
                "generate returned {}: {}",
                status,
                preview(&body)
            )));
        }

        let body: GenerateChunk = response.json().await?;
        Ok(body.response)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(limits::ERROR_BODY_PREVIEW_CHARS).collect()
}
