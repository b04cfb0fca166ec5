//! Append-only message log with a single open slot.
//!
//! The in-flight assistant message is tracked by index rather than by a
//! mutable reference handed out to callers. Appending while the slot is
//! open is refused, so the pending message is always the trailing entry
//! and at most one pending message can exist.

use super::message::{Message, MessageId};
use crate::core::error::DomainError;

/// How a pending message is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOutcome {
    /// Keep the text accumulated so far.
    Finished,
    /// Replace the accumulated text (e.g. with a user-facing error string).
    Replaced(String),
}

/// Ordered list of conversation turns.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    open: Option<usize>,
    next_seq: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The open (pending) message, if any.
    pub fn pending(&self) -> Option<&Message> {
        self.open.map(|idx| &self.messages[idx])
    }

    pub fn has_pending(&self) -> bool {
        self.open.is_some()
    }

    /// Allocate a fresh local message id.
    pub fn next_id(&mut self) -> MessageId {
        self.next_seq += 1;
        MessageId::local(self.next_seq)
    }

    /// Insert a message at the tail.
    ///
    /// Fails while a pending message is open, and for pending user messages.
    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        if let Some(open) = self.pending() {
            return Err(DomainError::PendingAlreadyOpen(open.id().to_string()));
        }
        if message.is_pending() {
            if message.origin() != super::message::Origin::Assistant {
                return Err(DomainError::PendingUserMessage);
            }
            self.open = Some(self.messages.len());
        }
        self.messages.push(message);
        Ok(())
    }

    /// Apply a text mutation to the pending message.
    ///
    /// Returns `false` (and does nothing) when no message is pending.
    pub fn update_trailing_pending(&mut self, mutator: impl FnOnce(&mut String)) -> bool {
        match self.open {
            Some(idx) => {
                mutator(self.messages[idx].text_mut());
                true
            }
            None => false,
        }
    }

    /// Close the pending message, fixing its terminal text.
    ///
    /// Returns the completed message, or `None` if nothing was pending.
    pub fn mark_pending_complete(&mut self, outcome: PendingOutcome) -> Option<&Message> {
        let idx = self.open.take()?;
        let message = &mut self.messages[idx];
        match outcome {
            PendingOutcome::Finished => message.complete(None),
            PendingOutcome::Replaced(text) => message.complete(Some(text)),
        }
        Some(&self.messages[idx])
    }

    /// Insert previously completed turns ahead of the current messages.
    ///
    /// Used once at session start by history hydration. Seeded messages are
    /// never pending, whatever the caller passes in.
    pub fn seed(&mut self, history: Vec<Message>) {
        if history.is_empty() {
            return;
        }
        let seeded: Vec<Message> = history
            .into_iter()
            .map(|mut m| {
                m.complete(None);
                m
            })
            .collect();
        let shift = seeded.len();
        self.messages.splice(0..0, seeded);
        if let Some(idx) = self.open.as_mut() {
            *idx += shift;
        }
    }
}
