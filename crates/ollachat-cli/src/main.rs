use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ollachat_cli::app;

#[derive(Parser)]
#[command(name = "ollachat")]
#[command(about = "Ollachat - chat with local Ollama models")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Ollama base URL
    #[arg(long)]
    base_url: Option<String>,

    /// SQLite database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory saved artifacts are written to
    #[arg(long)]
    output_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = ollachat_core::Settings::load();

    if let Some(model) = cli.model {
        settings.backend.model = Some(model);
    }
    if let Some(base_url) = cli.base_url {
        settings.backend.base_url = base_url;
    }
    if let Some(database) = cli.database {
        settings.storage.database_path = database;
    }
    if let Some(root) = cli.output_root {
        settings.output.root = root;
    }

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(settings, &prompt).await?;
    } else {
        app::run_repl(settings).await?;
    }

    Ok(())
}
