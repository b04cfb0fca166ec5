//! Remote transcript turns

use super::message::{Message, MessageId, Origin};

/// One turn of a remote transcript, as returned by a history fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTurn {
    pub id: String,
    pub origin: Origin,
    pub text: String,
    /// Remote creation timestamp (any monotonic unit the service uses).
    pub created_at: f64,
}

impl HistoryTurn {
    pub fn new(id: impl Into<String>, origin: Origin, text: impl Into<String>, created_at: f64) -> Self {
        Self {
            id: id.into(),
            origin,
            text: text.into(),
            created_at,
        }
    }

    pub fn into_message(self) -> Message {
        Message::completed(MessageId::new(self.id), self.origin, self.text)
    }
}

/// Convert remote turns into completed messages, oldest first.
///
/// The sort is stable, so turns with equal timestamps keep the order the
/// service returned them in.
pub fn order_history(mut turns: Vec<HistoryTurn>) -> Vec<Message> {
    turns.sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
    turns.into_iter().map(HistoryTurn::into_message).collect()
}
