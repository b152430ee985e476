//! Configuration management for the clinic agent
//!
//! Supports loading configuration from:
//! - TOML/YAML files (`config/default`, `config/{env}`, `config/local`)
//! - Environment variables (`CLINIC_AGENT_` prefix)

pub mod settings;

pub use settings::{
    load_settings, AgentConfig, BookingConfig, GatewayConfig, RuntimeEnvironment, ServerConfig,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
