//! Infrastructure layer for threadline
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP chat gateway with its stream
//! decoder, the file-backed thread store, the JSONL conversation logger,
//! and configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileReplConfig,
    FileServiceConfig, FileStorageConfig,
};
pub use http::{
    HttpChatGateway, HttpError, HttpGatewaySettings, LineBuffer, decode_event_stream, parse_record,
};
pub use logging::JsonlConversationLogger;
pub use store::FileThreadStore;
