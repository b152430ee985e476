//! Model gateway integration
//!
//! The language model is an external collaborator: this crate only knows
//! how to send conversation state plus tool declarations and to receive
//! either assistant text or structured tool-call requests. Gateway-level
//! failures are a distinct taxonomy from tool-level failures and are
//! terminal for the current turn.

pub mod gateway;
pub mod http;

pub use gateway::{GatewayResponse, ModelGateway};
pub use http::{HttpModelGateway, HttpGatewayConfig};

use thiserror::Error;

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Gateway timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
