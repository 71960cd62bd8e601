mod traits;
mod ollama;
mod binding;
pub mod stream;

pub use traits::*;
pub use ollama::OllamaHttp;
pub use binding::OllamaBinding;
pub use stream::{FlushBuffer, NdjsonDecoder};
