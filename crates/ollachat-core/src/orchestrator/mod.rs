mod tiers;

pub use tiers::{
    BindingTier, BlockingTier, ConnectivityProbe, HttpProbe, StreamingTier, Tier,
};

use crate::config::Settings;
use crate::error::GenerationError;
use crate::llm::{EventSender, GenerationEvent, GenerationRequest, OllamaBinding, OllamaHttp};
use tracing::{info, warn};

/// How a single tier attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TierVerdict {
    Success(String),
    /// Try the next tier.
    Fallthrough(GenerationError),
    /// Stop the chain and report.
    Fatal(GenerationError),
}

/// Classify a tier result. Blank text counts as `NoResponse`; the last tier
/// has nowhere to fall through to, so every failure there is fatal.
pub fn classify(result: Result<String, GenerationError>, is_last: bool) -> TierVerdict {
    match result {
        Ok(text) if !text.trim().is_empty() => TierVerdict::Success(text),
        Ok(_) if is_last => TierVerdict::Fatal(GenerationError::NoResponse),
        Ok(_) => TierVerdict::Fallthrough(GenerationError::NoResponse),
        Err(e) if is_last || e.is_fatal() => TierVerdict::Fatal(e),
        Err(e) => TierVerdict::Fallthrough(e),
    }
}

/// Drives the probe and the ordered tier chain for one request at a time.
///
/// Tiers run strictly in sequence; a tier only starts after the previous one
/// has failed. Exactly one terminal event (`Done` or `Error`) is sent per
/// call.
pub struct GenerationOrchestrator {
    probe: Option<Box<dyn ConnectivityProbe>>,
    tiers: Vec<Box<dyn Tier>>,
}

impl GenerationOrchestrator {
    pub fn new(tiers: Vec<Box<dyn Tier>>) -> Self {
        Self { probe: None, tiers }
    }

    pub fn with_probe(mut self, probe: Box<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Probe, streaming HTTP, plain HTTP, then the `ollama-rs` client, all
    /// against the configured backend.
    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let http = OllamaHttp::new(settings.backend.base_url.clone())
            .with_probe_timeout(settings.backend.probe_timeout());
        let binding = OllamaBinding::new(&settings.backend.base_url)?;

        Ok(Self::new(vec![
            Box::new(StreamingTier::new(http.clone(), settings.stream.flush_threshold)),
            Box::new(BlockingTier::new(http.clone())),
            Box::new(BindingTier::new(binding)),
        ])
        .with_probe(Box::new(HttpProbe::new(http))))
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
        events: &EventSender,
    ) -> Result<String, GenerationError> {
        let _ = events.send(GenerationEvent::Info(format!(
            "Contacting backend with model '{}'...",
            request.model
        )));

        if let Some(ref probe) = self.probe {
            if let Err(e) = probe.check().await {
                warn!("Connectivity probe failed: {e}");
                let _ = events.send(GenerationEvent::Info(format!("{e}; trying anyway")));
            }
        }

        let outcome = self.run_tiers(request, events).await;
        match &outcome {
            Ok(text) => {
                let _ = events.send(GenerationEvent::Done(text.clone()));
            }
            Err(e) => {
                warn!("Generation failed: {e}");
                let _ = events.send(GenerationEvent::Error(e.clone()));
            }
        }
        outcome
    }

    async fn run_tiers(
        &self,
        request: &GenerationRequest,
        events: &EventSender,
    ) -> Result<String, GenerationError> {
        let count = self.tiers.len();

        for (index, tier) in self.tiers.iter().enumerate() {
            let is_last = index + 1 == count;
            let result = tier.generate(request, events).await;

            match classify(result, is_last) {
                TierVerdict::Success(text) => {
                    info!("{} produced {} chars", tier.name(), text.len());
                    return Ok(text);
                }
                TierVerdict::Fatal(e) => return Err(e),
                TierVerdict::Fallthrough(e) => {
                    let next = self.tiers[index + 1].name();
                    info!("{} failed: {e}; falling back to {next}", tier.name());
                    let _ = events.send(GenerationEvent::Info(format!(
                        "{} failed: {e}; falling back to {next}.",
                        tier.name()
                    )));
                }
            }
        }

        Err(GenerationError::NoResponse)
    }
}
