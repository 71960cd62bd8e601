use crate::error::GenerationError;
use crate::llm::{EventSender, GenerationRequest, OllamaBinding, OllamaHttp};

/// One strategy in the ordered fallback chain.
#[async_trait::async_trait]
pub trait Tier: Send + Sync {
    /// Short label used in tier-transition notices.
    fn name(&self) -> &str;

    /// Try to produce the complete text for `request`. Only streaming tiers
    /// emit `Fragment` events.
    async fn generate(
        &self,
        request: &GenerationRequest,
        events: &EventSender,
    ) -> Result<String, GenerationError>;
}

/// Check run before the tiers. Its failure is only ever reported.
#[async_trait::async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn check(&self) -> Result<(), GenerationError>;
}

pub struct HttpProbe {
    http: OllamaHttp,
}

impl HttpProbe {
    pub fn new(http: OllamaHttp) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn check(&self) -> Result<(), GenerationError> {
        self.http.probe().await
    }
}

/// `/api/generate` with `stream: true`, flushing text as it arrives.
pub struct StreamingTier {
    http: OllamaHttp,
    flush_threshold: usize,
}

impl StreamingTier {
    pub fn new(http: OllamaHttp, flush_threshold: usize) -> Self {
        Self {
            http,
            flush_threshold,
        }
    }
}

#[async_trait::async_trait]
impl Tier for StreamingTier {
    fn name(&self) -> &str {
        "streaming HTTP generate"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        events: &EventSender,
    ) -> Result<String, GenerationError> {
        self.http
            .generate_stream(request, self.flush_threshold, events)
            .await
    }
}

/// `/api/generate` with `stream: false`.
pub struct BlockingTier {
    http: OllamaHttp,
}

impl BlockingTier {
    pub fn new(http: OllamaHttp) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl Tier for BlockingTier {
    fn name(&self) -> &str {
        "HTTP generate"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        _events: &EventSender,
    ) -> Result<String, GenerationError> {
        self.http.generate(request).await
    }
}

/// Last resort through the `ollama-rs` client.
pub struct BindingTier {
    binding: OllamaBinding,
}

impl BindingTier {
    pub fn new(binding: OllamaBinding) -> Self {
        Self { binding }
    }
}

#[async_trait::async_trait]
impl Tier for BindingTier {
    fn name(&self) -> &str {
        "Ollama client"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        _events: &EventSender,
    ) -> Result<String, GenerationError> {
        self.binding.generate(request).await
    }
}
