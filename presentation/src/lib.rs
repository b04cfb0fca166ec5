//! Presentation layer for threadline
//!
//! This crate contains the CLI definition, the interactive chat REPL,
//! live reply rendering and console formatting.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ConsoleRenderer, ReplCommand};
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
