/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Change the model.
    ModelChanged(String),
    /// List models known to the backend.
    ListModels,
    /// Select a file for context or summarization.
    SelectFile(String),
    /// Add a file (or the selected one) to the prompt context.
    AddToContext(Option<String>),
    /// Show the files currently in context.
    ShowContext,
    /// Drop every context file.
    ClearContext,
    /// Summarize a file (or the selected one).
    Summarize(Option<String>),
    /// Save the latest reply or summary under the output root.
    SaveArtifact,
    /// Change where artifacts are saved.
    ChangeOutputRoot(String),
    /// Show the output root and artifacts saved this session.
    ShowOutput,
    /// List files in the working directory.
    RefreshExplorer { recursive: bool },
    /// Replay stored messages of this session.
    ShowHistory,
    /// Not a command - treat as regular input.
    NotACommand,
}

fn optional(arg: &str) -> Option<String> {
    if arg.is_empty() {
        None
    } else {
        Some(arg.to_string())
    }
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,

        // Model commands
        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-name>. Use /models to list.".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/models" => CommandResult::ListModels,

        // Context commands
        "/select" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /select <path>".into())
            } else {
                CommandResult::SelectFile(arg.to_string())
            }
        }
        "/add" => CommandResult::AddToContext(optional(arg)),
        "/context" => CommandResult::ShowContext,
        "/clear-context" | "/clear" => CommandResult::ClearContext,

        // Artifact commands
        "/summarize" | "/sum" => CommandResult::Summarize(optional(arg)),
        "/save" => CommandResult::SaveArtifact,
        "/root" => {
            if arg.is_empty() {
                CommandResult::ShowOutput
            } else {
                CommandResult::ChangeOutputRoot(arg.to_string())
            }
        }
        "/output" => CommandResult::ShowOutput,

        // Project commands
        "/files" | "/tree" => CommandResult::RefreshExplorer {
            recursive: matches!(arg, "-r" | "--recursive"),
        },
        "/history" => CommandResult::ShowHistory,
        "/version" => CommandResult::Message(format!("Ollachat CLI v{}", env!("CARGO_PKG_VERSION"))),

        // Unknown command
        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ Ollachat Commands ────────────────────────────────────────────╮

  MODEL
    /model <name>             Change model
    /models                   List models available on the backend

  CONTEXT
    /select <path>            Select a file
    /add [path]               Add a file (default: selected) to context
    /context                  Show context files
    /clear-context, /clear    Remove all context files

  ARTIFACTS
    /summarize [path], /sum   Summarize a file (default: selected)
    /save                     Save the latest reply or summary
    /root [dir]               Show or change the output root
    /output                   Show output root and saved artifacts

  PROJECT
    /files [-r], /tree        List files in the working directory
    /history                  Show this session's messages

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
