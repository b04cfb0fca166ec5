//! Interactive chat module
//!
//! Provides the reedline-based chat REPL and the live renderer that
//! follows a streaming reply.

mod renderer;
mod repl;

pub use renderer::ConsoleRenderer;
pub use repl::{ChatRepl, ReplCommand};
