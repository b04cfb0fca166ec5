//! Streaming events for a single reply.
//!
//! [`StreamEvent`] is what the stream decoder yields for each well-formed
//! record. A well-formed stream carries at most one [`ThreadAssigned`],
//! any number of [`TextDelta`]s in arrival order, and at most one
//! [`StreamFailed`], which ends processing of that stream.
//!
//! [`ThreadAssigned`]: StreamEvent::ThreadAssigned
//! [`TextDelta`]: StreamEvent::TextDelta
//! [`StreamFailed`]: StreamEvent::StreamFailed

use crate::conversation::thread::ThreadId;

/// An event in a streaming reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The service assigned (or confirmed) the conversation thread.
    ThreadAssigned { id: ThreadId },
    /// An incremental fragment of assistant output.
    TextDelta { fragment: String },
    /// The service reported a failure; no further events are processed.
    StreamFailed { message: String },
}

impl StreamEvent {
    pub fn thread_assigned(id: ThreadId) -> Self {
        StreamEvent::ThreadAssigned { id }
    }

    pub fn delta(fragment: impl Into<String>) -> Self {
        StreamEvent::TextDelta {
            fragment: fragment.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        StreamEvent::StreamFailed {
            message: message.into(),
        }
    }

    /// Returns the fragment if this is a text delta.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::TextDelta { fragment } => Some(fragment),
            _ => None,
        }
    }

    /// Returns true if this event ends processing of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::StreamFailed { .. })
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::ThreadAssigned { .. } => "thread_assigned",
            StreamEvent::TextDelta { .. } => "text_delta",
            StreamEvent::StreamFailed { .. } => "stream_failed",
        }
    }
}
