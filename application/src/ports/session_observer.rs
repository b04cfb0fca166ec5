//! Session observer port
//!
//! Lets the rendering layer follow a conversation without write access to
//! the message log. Callbacks run on the task driving the send, after the
//! controller has released its internal lock.

use threadline_domain::{Message, SessionState, ThreadId};

/// Callbacks for conversation progress.
///
/// Implementations live in the presentation layer.
pub trait SessionObserver: Send + Sync {
    /// Called on every state machine transition.
    fn on_state_change(&self, _state: SessionState) {}

    /// Called for each text fragment appended to the pending message.
    fn on_delta(&self, _fragment: &str) {}

    /// Called when the pending message is completed (finished, failed or interrupted).
    fn on_turn_complete(&self, _message: &Message) {}

    /// Called when a thread id is assigned and persisted.
    fn on_thread_assigned(&self, _id: &ThreadId) {}
}

/// No-op observer for when nothing is rendering
pub struct NoSessionObserver;

impl SessionObserver for NoSessionObserver {}
