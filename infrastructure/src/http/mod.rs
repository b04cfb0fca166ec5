//! HTTP adapter for the remote chat service
//!
//! - [`gateway`]: [`HttpChatGateway`], the reqwest implementation of the
//!   `ChatGateway` port
//! - [`decoder`]: incremental NDJSON decoding of the reply body
//! - [`protocol`]: wire types for requests, stream records and history

pub mod decoder;
pub mod error;
pub mod gateway;
pub mod protocol;

pub use decoder::{LineBuffer, decode_event_stream, parse_record};
pub use error::HttpError;
pub use gateway::{HttpChatGateway, HttpGatewaySettings};
