use ollachat_cli::EventPrinter;
use ollachat_core::*;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

/// Flushes one line of a reply, then loses the connection.
struct BrokenStream;

#[async_trait::async_trait]
impl Tier for BrokenStream {
    fn name(&self) -> &str {
        "stream"
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
        events: &EventSender,
    ) -> Result<String, GenerationError> {
        let _ = events.send(GenerationEvent::Fragment("Recursion is\n".into()));
        Err(GenerationError::Stream("connection reset".into()))
    }
}

struct Plain(&'static str);

#[async_trait::async_trait]
impl Tier for Plain {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
        _events: &EventSender,
    ) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

async fn print_generation(tiers: Vec<Box<dyn Tier>>) -> (String, String) {
    let orchestrator = GenerationOrchestrator::new(tiers);
    let request = GenerationRequest::new(
        "Explain recursion",
        "llama3",
        GenerationKind::Chat,
        Duration::from_secs(120),
    );
    let (tx, mut rx) = unbounded_channel();
    let _ = orchestrator.generate(&request, &tx).await;
    drop(tx);

    let mut printer = EventPrinter::new(Vec::new(), Vec::new());
    while let Some(event) = rx.recv().await {
        printer.handle(event).unwrap();
    }
    let (out, err) = printer.into_inner();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

#[tokio::test]
async fn test_fallback_reply_is_shown_after_interrupted_stream() {
    let (out, err) = print_generation(vec![
        Box::new(BrokenStream),
        Box::new(Plain("Recursion is a function calling itself.")),
    ])
    .await;

    assert!(out.contains("Recursion is\n"));
    assert!(out.contains("Recursion is a function calling itself."));
    assert!(err.contains("stream interrupted; full reply follows"));
    assert!(err.contains("falling back to http"));
}

#[test]
fn test_complete_stream_is_not_repeated() {
    let mut printer = EventPrinter::new(Vec::new(), Vec::new());
    for event in [
        GenerationEvent::Fragment("Hello, world!\n".into()),
        GenerationEvent::Fragment("tail".into()),
        GenerationEvent::Done("Hello, world!\ntail".into()),
    ] {
        printer.handle(event).unwrap();
    }
    let (out, err) = printer.into_inner();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches("Hello, world!").count(), 1);
    assert!(err.is_empty());
}

#[tokio::test]
async fn test_unstreamed_reply_is_rendered_once() {
    let (out, _err) = print_generation(vec![Box::new(Plain("# Title\n\n**bold** text"))]).await;
    assert_eq!(out.matches("Title").count(), 1);
    assert!(out.contains("# Title\n\nbold text"));
}

#[test]
fn test_read_failure_goes_to_stderr() {
    let mut printer = EventPrinter::new(Vec::new(), Vec::new());
    printer
        .handle(GenerationEvent::ReadFailed {
            path: "missing.rs".into(),
            reason: "No such file or directory".into(),
        })
        .unwrap();
    let (out, err) = printer.into_inner();
    assert!(out.is_empty());
    assert!(String::from_utf8(err).unwrap().contains("Could not read missing.rs"));
}
