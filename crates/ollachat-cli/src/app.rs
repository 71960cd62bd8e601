use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use ollachat_core::llm::GenerationEvent;
use ollachat_core::{ChatSession, Role, SessionChange, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::commands::{handle_command, CommandResult};
use crate::printer::EventPrinter;
use crate::render::render_markdown;

async fn print_events(mut rx: mpsc::UnboundedReceiver<GenerationEvent>) {
    let mut printer = EventPrinter::new(std::io::stdout(), std::io::stderr());
    while let Some(event) = rx.recv().await {
        if let Err(e) = printer.handle(event) {
            tracing::warn!("Failed to write generation output: {e}");
        }
    }
}

/// Run `f` with a fresh event channel and a printer draining it. Returns
/// once both the call and the printer are finished.
async fn with_printer<T, F, Fut>(f: F) -> T
where
    F: FnOnce(mpsc::UnboundedSender<GenerationEvent>) -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(rx));
    let result = f(tx).await;
    let _ = printer.await;
    result
}

fn build_session(settings: Settings) -> Result<ChatSession> {
    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let hook = Arc::new(|change: &SessionChange| match change {
        SessionChange::Loading(true) => tracing::debug!("generation started"),
        SessionChange::Loading(false) => tracing::debug!("generation finished"),
        other => tracing::debug!("session change: {other:?}"),
    });
    Ok(ChatSession::open(settings)?
        .with_working_dir(working_dir)
        .with_notify(hook))
}

pub async fn run_single_prompt(settings: Settings, prompt: &str) -> Result<()> {
    let session = build_session(settings)?;
    with_printer(|tx| async move { session.submit_message(prompt, &tx).await }).await?;
    Ok(())
}

pub async fn run_repl(settings: Settings) -> Result<()> {
    let session = build_session(settings)?;

    println!("Ollachat v{} - type /help for commands", env!("CARGO_PKG_VERSION"));
    match session.model() {
        Some(model) => println!("Model: {model}"),
        None => {
            println!("No model configured. Pick one with /model <name>.");
            print_models(&session).await;
        }
    }
    print_history(&session).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match handle_command(input) {
            CommandResult::Quit => break,
            result => dispatch(&session, input, result).await,
        }
    }

    Ok(())
}

async fn dispatch(session: &ChatSession, input: &str, result: CommandResult) {
    match result {
        CommandResult::Message(msg) => println!("{msg}"),
        CommandResult::Quit => {}
        CommandResult::ModelChanged(model) => {
            let model = session.set_model(model);
            println!("Model set to {model}");
        }
        CommandResult::ListModels => print_models(session).await,
        CommandResult::SelectFile(path) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                eprintln!("[warn] {} is not a file", path.display());
            }
            if let Some(selected) = session.select_file(path) {
                println!("Selected {}", selected.display());
            }
        }
        CommandResult::AddToContext(path) => {
            let added = match path {
                Some(path) => session.add_path_to_context(path),
                None if session.selected_file().is_none() => {
                    println!("No file selected. Use /select <path> or /add <path>.");
                    return;
                }
                None => session.add_to_context(),
            };
            if added {
                println!("Context: {} file(s)", session.context_files().len());
            } else {
                println!("Not added (missing file or already in context).");
            }
        }
        CommandResult::ShowContext => {
            let files = session.context_files();
            if files.is_empty() {
                println!("No context files.");
            }
            for file in files {
                println!("  {}", file.display());
            }
        }
        CommandResult::ClearContext => {
            session.clear_context();
            println!("Context cleared.");
        }
        CommandResult::Summarize(path) => {
            let outcome = with_printer(|tx| async move {
                match path {
                    Some(path) => session.summarize_file(&PathBuf::from(path), &tx).await,
                    None => session.summarize_selected(&tx).await,
                }
            })
            .await;
            report(outcome.map(|_| ()));
        }
        CommandResult::SaveArtifact => match session.save_artifact().await {
            Ok(Some(path)) => println!("Saved {}", path.display()),
            Ok(None) => println!("Nothing to save yet."),
            Err(e) => eprintln!("[error] {e}"),
        },
        CommandResult::ChangeOutputRoot(root) => {
            let root = session.change_output_root(root);
            println!("Output root: {}", root.display());
        }
        CommandResult::ShowOutput => {
            println!("Output root: {}", session.output_root().display());
            for path in session.recent_artifacts() {
                println!("  {}", path.display());
            }
        }
        CommandResult::RefreshExplorer { recursive } => match session.refresh_explorer(recursive).await {
            Ok(entries) => {
                for entry in entries {
                    let suffix = if entry.is_dir { "/" } else { "" };
                    println!("  {}{suffix}", entry.relative.display());
                }
            }
            Err(e) => eprintln!("[error] {e}"),
        },
        CommandResult::ShowHistory => print_history(session).await,
        CommandResult::NotACommand => {
            let outcome =
                with_printer(|tx| async move { session.submit_message(input, &tx).await }).await;
            report(outcome.map(|_| ()));
        }
    }
}

/// Generation and read errors were already printed from the event stream.
fn report(outcome: ollachat_core::error::Result<()>) {
    match outcome {
        Ok(())
        | Err(ollachat_core::ChatError::Generation(_))
        | Err(ollachat_core::ChatError::FileRead { .. }) => {}
        Err(e) => eprintln!("[error] {e}"),
    }
}

async fn print_models(session: &ChatSession) {
    match session.list_models().await {
        Ok(models) if models.is_empty() => println!("No models installed on the backend."),
        Ok(models) => {
            println!("Available models:");
            for model in models {
                println!("  {model}");
            }
        }
        Err(e) => eprintln!("[error] Could not list models: {e}"),
    }
}

async fn print_history(session: &ChatSession) {
    match session.history().await {
        Ok(messages) if messages.is_empty() => println!("Welcome! Ask me anything."),
        Ok(messages) => {
            for (role, content) in messages {
                let label = match role {
                    Role::User => "you",
                    Role::Assistant => "assistant",
                    Role::System => "system",
                };
                println!("[{label}]\n{}\n", render_markdown(&content));
            }
        }
        Err(e) => eprintln!("[warn] Could not load history: {e}"),
    }
}
