use ollachat_core::llm::OllamaHttp;
use ollachat_core::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::unbounded_channel;

type Handler = Arc<dyn Fn(&str) -> (u16, String) + Send + Sync>;

/// Minimal HTTP/1.1 backend answering every connection through `handler`,
/// which sees the raw request (head and body).
async fn spawn_backend(handler: Handler) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move { serve(socket, handler).await });
        }
    });

    format!("http://{addr}")
}

async fn serve(mut socket: TcpStream, handler: Handler) {
    let request = read_request(&mut socket).await;
    let (status, body) = handler(&request);
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn is_streaming(request: &str) -> bool {
    request.contains("\"stream\":true")
}

fn request() -> GenerationRequest {
    GenerationRequest::new("Hi", "llama3", GenerationKind::Chat, Duration::from_secs(5))
}

#[tokio::test]
async fn test_probe_accepts_200() {
    let base = spawn_backend(Arc::new(|_: &str| (200, "{\"models\":[]}".to_string()))).await;
    assert!(OllamaHttp::new(base).probe().await.is_ok());
}

#[tokio::test]
async fn test_probe_reports_non_200() {
    let base = spawn_backend(Arc::new(|_: &str| (503, "loading".to_string()))).await;
    let err = OllamaHttp::new(base).probe().await.unwrap_err();
    assert!(matches!(err, GenerationError::Probe(ref msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_probe_reports_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = OllamaHttp::new(format!("http://{addr}"))
        .with_probe_timeout(Duration::from_secs(2))
        .probe()
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Probe(_)));
}

#[tokio::test]
async fn test_list_models_reads_tags() {
    let base = spawn_backend(Arc::new(|_: &str| {
        (
            200,
            "{\"models\":[{\"name\":\"llama3:latest\",\"size\":1},{\"name\":\"mistral\"}]}"
                .to_string(),
        )
    }))
    .await;
    let models = OllamaHttp::new(base).list_models().await.unwrap();
    assert_eq!(models, vec!["llama3:latest", "mistral"]);
}

#[tokio::test]
async fn test_stream_flushes_and_stops_at_done() {
    let body = [
        "{\"response\":\"Hel\",\"done\":false}",
        "this line is not json",
        "{\"response\":\"lo\\n\",\"done\":false}",
        "{\"response\":\"tail\",\"done\":true}",
        "{\"response\":\"after done\",\"done\":false}",
    ]
    .join("\n");
    let base = spawn_backend(Arc::new(move |req: &str| {
        assert!(is_streaming(req));
        (200, body.clone())
    }))
    .await;
    let (tx, mut rx) = unbounded_channel();

    let text = OllamaHttp::new(base)
        .generate_stream(&request(), 200, &tx)
        .await
        .unwrap();

    assert_eq!(text, "Hello\ntail");
    let mut fragments = Vec::new();
    while let Ok(GenerationEvent::Fragment(f)) = rx.try_recv() {
        fragments.push(f);
    }
    assert_eq!(fragments, vec!["Hello\n", "tail"]);
}

#[tokio::test]
async fn test_stream_ends_at_close_without_done() {
    let base = spawn_backend(Arc::new(|_: &str| {
        (200, "{\"response\":\"partial\",\"done\":false}\n".to_string())
    }))
    .await;
    let (tx, _rx) = unbounded_channel();

    let text = OllamaHttp::new(base)
        .generate_stream(&request(), 200, &tx)
        .await
        .unwrap();
    assert_eq!(text, "partial");
}

#[tokio::test]
async fn test_stream_non_200_is_stream_failure() {
    let base = spawn_backend(Arc::new(|_: &str| (500, "boom".to_string()))).await;
    let (tx, _rx) = unbounded_channel();

    let err = OllamaHttp::new(base)
        .generate_stream(&request(), 200, &tx)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Stream(ref msg) if msg.contains("500")));
}

#[tokio::test]
async fn test_generate_returns_response_field() {
    let base = spawn_backend(Arc::new(|req: &str| {
        assert!(req.contains("\"stream\":false"));
        assert!(req.contains("\"model\":\"llama3\""));
        (200, "{\"response\":\"whole answer\",\"done\":true}".to_string())
    }))
    .await;

    let text = OllamaHttp::new(base).generate(&request()).await.unwrap();
    assert_eq!(text, "whole answer");
}

#[tokio::test]
async fn test_generate_non_200_is_transport_failure() {
    let base = spawn_backend(Arc::new(|_: &str| (404, "model not found".to_string()))).await;
    let err = OllamaHttp::new(base).generate(&request()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Transport(ref msg) if msg.contains("model not found")));
}

#[tokio::test]
async fn test_default_chain_falls_back_from_stream_to_plain_http() {
    let base = spawn_backend(Arc::new(|req: &str| {
        if req.starts_with("GET") {
            (200, "{\"models\":[]}".to_string())
        } else if is_streaming(req) {
            (500, "stream broke".to_string())
        } else {
            (200, "{\"response\":\"plain answer\",\"done\":true}".to_string())
        }
    }))
    .await;

    let mut settings = Settings::default();
    settings.backend.base_url = base;
    let orchestrator = GenerationOrchestrator::from_settings(&settings).unwrap();
    assert_eq!(
        orchestrator.tier_names(),
        vec!["streaming HTTP generate", "HTTP generate", "Ollama client"]
    );
    let (tx, mut rx) = unbounded_channel();

    let text = orchestrator.generate(&request(), &tx).await.unwrap();

    assert_eq!(text, "plain answer");
    let mut saw_fallback = false;
    let mut done = None;
    while let Ok(event) = rx.try_recv() {
        match event {
            GenerationEvent::Info(msg) if msg.contains("falling back to HTTP generate") => {
                saw_fallback = true
            }
            GenerationEvent::Done(text) => done = Some(text),
            _ => {}
        }
    }
    assert!(saw_fallback);
    assert_eq!(done.as_deref(), Some("plain answer"));
}
