//! Conversation domain.
//!
//! - [`message::Message`] — a single turn (user or assistant)
//! - [`log::MessageLog`] — append-only turn list with one open slot
//! - [`thread::ThreadId`] — server-assigned conversation identity
//! - [`history::HistoryTurn`] — a turn from a remote transcript fetch

pub mod history;
pub mod log;
pub mod message;
pub mod thread;
