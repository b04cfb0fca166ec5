//! Streaming session domain.
//!
//! - [`event::StreamEvent`] — one decoded record of a reply stream
//! - [`state::SessionState`] — the send state machine's states

pub mod event;
pub mod state;
