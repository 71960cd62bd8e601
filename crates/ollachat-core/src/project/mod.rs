pub mod explorer;

pub use explorer::{list_entries, ExplorerEntry};
