//! Wire types for the chat service
//!
//! Send request body:
//!
//! ```json
//! {"message": "hello", "threadId": null}
//! ```
//!
//! Reply body, one JSON record per line:
//!
//! ```text
//! {"type":"threadId","threadId":"t1"}
//! {"type":"delta","content":"Hi"}
//! {"type":"error","message":"boom"}
//! ```
//!
//! History response:
//!
//! ```json
//! {"messages": [{"id": "m1", "role": "user", "text": "Hi", "created_at": 1700000000.0}]}
//! ```

use serde::{Deserialize, Serialize};
use threadline_application::SendRequest;
use threadline_domain::{HistoryTurn, Origin, StreamEvent, ThreadId};
use tracing::warn;

/// JSON body of a send request.
#[derive(Debug, Serialize)]
pub struct SendRequestBody<'a> {
    pub message: &'a str,
    /// Serialized as `null` until a thread has been assigned.
    #[serde(rename = "threadId")]
    pub thread_id: Option<&'a str>,
}

impl<'a> From<&'a SendRequest> for SendRequestBody<'a> {
    fn from(request: &'a SendRequest) -> Self {
        Self {
            message: &request.message,
            thread_id: request.thread_id.as_ref().map(ThreadId::as_str),
        }
    }
}

/// One record of the reply stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum WireRecord {
    #[serde(rename = "threadId")]
    ThreadId {
        #[serde(rename = "threadId")]
        thread_id: String,
    },
    #[serde(rename = "delta")]
    Delta { content: String },
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },
}

impl WireRecord {
    /// Convert into a domain event.
    ///
    /// A thread record with a blank id carries nothing usable and is dropped.
    pub fn into_event(self) -> Option<StreamEvent> {
        match self {
            WireRecord::ThreadId { thread_id } => match ThreadId::new(thread_id) {
                Ok(id) => Some(StreamEvent::thread_assigned(id)),
                Err(e) => {
                    warn!("Discarding thread record: {}", e);
                    None
                }
            },
            WireRecord::Delta { content } => Some(StreamEvent::delta(content)),
            WireRecord::Error { message } => Some(StreamEvent::failed(message)),
        }
    }
}

/// Body of a history fetch response.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryResponse {
    /// Absent and empty both mean a fresh thread.
    #[serde(default)]
    pub messages: Option<Vec<WireHistoryMessage>>,
}

/// One remote transcript entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryMessage {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: f64,
}

impl HistoryResponse {
    /// Convert to domain turns, skipping roles the client does not render.
    pub fn into_turns(self) -> Vec<HistoryTurn> {
        self.messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| match Origin::from_role(&m.role) {
                Some(origin) => Some(HistoryTurn::new(m.id, origin, m.text, m.created_at)),
                None => {
                    warn!("Skipping history message {} with role '{}'", m.id, m.role);
                    None
                }
            })
            .collect()
    }
}
