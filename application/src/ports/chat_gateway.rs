//! Chat gateway port
//!
//! Defines how the application layer talks to the remote chat service:
//! opening a streaming reply for one user message, and fetching the
//! transcript of an existing thread.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use threadline_domain::{HistoryTurn, StreamEvent, ThreadId};

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Decoded reply stream.
///
/// Yields events in arrival order. An `Err` item reports a transport
/// failure (connection dropped, body read error) and is the last item.
/// Consuming the stream is destructive; it cannot be restarted.
pub type EventStream = BoxStream<'static, Result<StreamEvent, GatewayError>>;

/// One outbound user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub message: String,
    /// `None` until the service has assigned a thread.
    pub thread_id: Option<ThreadId>,
}

impl SendRequest {
    pub fn new(message: impl Into<String>, thread_id: Option<ThreadId>) -> Self {
        Self {
            message: message.into(),
            thread_id,
        }
    }
}

/// Gateway to the remote chat service
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a user message and open the reply stream.
    ///
    /// A non-success response status must be reported as an error here,
    /// before any event is yielded.
    async fn send(&self, request: &SendRequest) -> Result<EventStream, GatewayError>;

    /// Fetch the full transcript of a thread.
    ///
    /// An empty vector is a valid answer (fresh thread).
    async fn fetch_history(&self, thread_id: &ThreadId) -> Result<Vec<HistoryTurn>, GatewayError>;
}
