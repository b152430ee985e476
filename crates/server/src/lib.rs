//! HTTP server for the clinic scheduling agent
//!
//! Exposes session, chat, availability and booking endpoints over the
//! agent and scheduling crates.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;
