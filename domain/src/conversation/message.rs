//! Conversation message entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::User => "user",
            Origin::Assistant => "assistant",
        }
    }

    /// Map a remote `role` string onto an origin.
    ///
    /// Returns `None` for roles this client does not render (e.g. `system`).
    pub fn from_role(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Origin::User),
            "assistant" => Some(Origin::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a message, unique within a thread.
///
/// Remote transcripts carry their own ids; locally created turns get
/// `local-<seq>` ids from the [`MessageLog`](super::log::MessageLog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn local(seq: u64) -> Self {
        Self(format!("local-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A conversational turn (Entity)
///
/// `text` only grows while `pending` is true and is fixed once the message
/// is completed. User messages are never pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    origin: Origin,
    text: String,
    pending: bool,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            origin: Origin::User,
            text: text.into(),
            pending: false,
        }
    }

    /// An empty assistant message awaiting streamed text.
    pub fn pending_assistant(id: MessageId) -> Self {
        Self {
            id,
            origin: Origin::Assistant,
            text: String::new(),
            pending: true,
        }
    }

    /// A finished message of either origin (e.g. from a history fetch).
    pub fn completed(id: MessageId, origin: Origin, text: impl Into<String>) -> Self {
        Self {
            id,
            origin,
            text: text.into(),
            pending: false,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub(crate) fn complete(&mut self, text: Option<String>) {
        if let Some(text) = text {
            self.text = text;
        }
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_is_never_pending() {
        let msg = Message::user(MessageId::local(1), "hello");
        assert_eq!(msg.origin(), Origin::User);
        assert_eq!(msg.text(), "hello");
        assert!(!msg.is_pending());
    }

    #[test]
    fn pending_assistant_starts_empty() {
        let msg = Message::pending_assistant(MessageId::local(2));
        assert_eq!(msg.origin(), Origin::Assistant);
        assert!(msg.text().is_empty());
        assert!(msg.is_pending());
    }

    #[test]
    fn origin_from_role() {
        assert_eq!(Origin::from_role("user"), Some(Origin::User));
        assert_eq!(Origin::from_role("assistant"), Some(Origin::Assistant));
        assert_eq!(Origin::from_role("system"), None);
    }

    #[test]
    fn message_serializes_for_rendering() {
        let msg = Message::completed(MessageId::new("m1"), Origin::Assistant, "Hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], "m1");
        assert_eq!(json["origin"], "assistant");
        assert_eq!(json["text"], "Hi");
        assert_eq!(json["pending"], false);
    }
}
