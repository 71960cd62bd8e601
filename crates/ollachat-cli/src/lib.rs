// Library interface for ollachat-cli
// This allows integration tests to access internal modules

pub mod app;
pub mod commands;
pub mod printer;
pub mod render;

// Re-export commonly used items for easier testing
pub use commands::{handle_command, CommandResult};
pub use printer::EventPrinter;
pub use render::render_markdown;
