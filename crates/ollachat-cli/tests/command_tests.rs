use ollachat_cli::{handle_command, render_markdown, CommandResult};

#[test]
fn plain_text_is_chat_input() {
    assert_eq!(handle_command("Explain recursion"), CommandResult::NotACommand);
    assert_eq!(handle_command("  what is /etc?  "), CommandResult::NotACommand);
}

#[test]
fn quit_aliases() {
    for input in ["/quit", "/exit", "/q"] {
        assert_eq!(handle_command(input), CommandResult::Quit);
    }
}

#[test]
fn model_requires_argument() {
    assert_eq!(
        handle_command("/model llama3"),
        CommandResult::ModelChanged("llama3".into())
    );
    assert!(matches!(handle_command("/model"), CommandResult::Message(_)));
    assert_eq!(handle_command("/models"), CommandResult::ListModels);
}

#[test]
fn context_commands() {
    assert_eq!(
        handle_command("/select src/main.rs"),
        CommandResult::SelectFile("src/main.rs".into())
    );
    assert!(matches!(handle_command("/select"), CommandResult::Message(_)));
    assert_eq!(handle_command("/add"), CommandResult::AddToContext(None));
    assert_eq!(
        handle_command("/add notes.md"),
        CommandResult::AddToContext(Some("notes.md".into()))
    );
    assert_eq!(handle_command("/context"), CommandResult::ShowContext);
    assert_eq!(handle_command("/clear-context"), CommandResult::ClearContext);
}

#[test]
fn artifact_commands() {
    assert_eq!(handle_command("/summarize"), CommandResult::Summarize(None));
    assert_eq!(
        handle_command("/sum README.md"),
        CommandResult::Summarize(Some("README.md".into()))
    );
    assert_eq!(handle_command("/save"), CommandResult::SaveArtifact);
    assert_eq!(
        handle_command("/root /tmp/out"),
        CommandResult::ChangeOutputRoot("/tmp/out".into())
    );
    assert_eq!(handle_command("/root"), CommandResult::ShowOutput);
}

#[test]
fn explorer_and_history() {
    assert_eq!(
        handle_command("/files"),
        CommandResult::RefreshExplorer { recursive: false }
    );
    assert_eq!(
        handle_command("/files -r"),
        CommandResult::RefreshExplorer { recursive: true }
    );
    assert_eq!(handle_command("/history"), CommandResult::ShowHistory);
}

#[test]
fn unknown_slash_command_is_reported() {
    match handle_command("/frobnicate") {
        CommandResult::Message(msg) => assert!(msg.contains("Unknown command: /frobnicate")),
        other => panic!("expected message, got {other:?}"),
    }
}

#[test]
fn help_lists_every_section() {
    let CommandResult::Message(help) = handle_command("/help") else {
        panic!("help should be a message");
    };
    for section in ["MODEL", "CONTEXT", "ARTIFACTS", "PROJECT", "OTHER"] {
        assert!(help.contains(section), "missing {section}");
    }
}

#[test]
fn reply_markdown_renders_to_plain_text() {
    let rendered = render_markdown("## Recursion\n\nA function that calls **itself**.");
    assert_eq!(rendered, "## Recursion\n\nA function that calls itself.");
}
