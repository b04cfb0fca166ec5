//! Domain layer for threadline
//!
//! This crate contains the conversation entities, the in-flight message log
//! and the stream event vocabulary. It has no dependencies on transport,
//! storage or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Thread
//!
//! A server-side conversation identity ([`ThreadId`]) that scopes message
//! history. It is assigned by the remote service on the first send and
//! persisted by the client so the conversation can be resumed.
//!
//! ## Message Log
//!
//! [`MessageLog`] is an append-only list of turns with a single "open slot":
//! the pending assistant message whose text is still being streamed.
//!
//! ## Stream Events
//!
//! [`StreamEvent`] is the decoded form of one wire record:
//! thread assignment, text delta or stream failure.

pub mod conversation;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use conversation::{
    history::{HistoryTurn, order_history},
    log::{MessageLog, PendingOutcome},
    message::{Message, MessageId, Origin},
    thread::ThreadId,
};
pub use core::{error::DomainError, string::truncate};
pub use session::{
    event::StreamEvent,
    state::{SessionState, TURN_FAILED_TEXT},
};
