//! Session state machine states

use std::fmt;

/// Fixed user-facing text that replaces a failed reply.
pub const TURN_FAILED_TEXT: &str = "Sorry, something went wrong while generating a response. Please try again.";

/// State of the send state machine.
///
/// ```text
/// Idle ──send──▶ AwaitingFirstByte ──first delta──▶ Streaming ──end──▶ Idle
///                       │                               │
///                       └──────── failure ──────────────┴──▶ Errored
/// ```
///
/// `Errored` is not sticky: the next send starts from it like from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingFirstByte,
    Streaming,
    Errored,
}

impl SessionState {
    /// Whether a new send may begin in this state.
    pub fn accepts_send(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Errored)
    }

    /// True while a reply stream is open.
    pub fn is_busy(&self) -> bool {
        !self.accepts_send()
    }

    /// True until the first content fragment arrives.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::AwaitingFirstByte)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingFirstByte => "awaiting_first_byte",
            SessionState::Streaming => "streaming",
            SessionState::Errored => "errored",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
