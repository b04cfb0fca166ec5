//! Application layer for threadline
//!
//! This crate contains the conversation controller, history hydration and
//! the port definitions that adapters implement. It depends only on the
//! domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_gateway::{ChatGateway, EventStream, GatewayError, SendRequest},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    session_observer::{NoSessionObserver, SessionObserver},
    thread_store::{InMemoryThreadStore, StoreError, ThreadIdentityStore},
};
pub use use_cases::conversation_controller::{
    ConversationController, RejectReason, SendOutcome, TurnFailure,
};
pub use use_cases::hydrate_history::{HydrateHistoryUseCase, HydrationOutcome, HydrationStatus};
