mod builder;
mod selection;

pub use builder::PromptComposer;
pub use selection::ContextSelection;
