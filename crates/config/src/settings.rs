//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Agent orchestrator configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Booking service configuration
    #[serde(default)]
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checks
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (empty = localhost default)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Model gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API endpoint base URL
    #[serde(default = "default_gateway_endpoint")]
    pub endpoint: String,

    /// API key; falls back to MODEL_GATEWAY_API_KEY
    #[serde(default = "default_gateway_api_key")]
    pub api_key: String,

    /// Model identifier sent on every request
    #[serde(default = "default_gateway_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_gateway_api_key() -> String {
    std::env::var("MODEL_GATEWAY_API_KEY").unwrap_or_default()
}

fn default_gateway_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gateway_endpoint(),
            api_key: default_gateway_api_key(),
            model: default_gateway_model(),
            timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

/// Agent orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on tool-use rounds per user message
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Per-tool execution timeout in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Tools enabled for this deployment's conversation context
    #[serde(default = "default_enabled_tools")]
    pub enabled_tools: Vec<String>,

    /// System instruction sent with every gateway call
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Maximum concurrently held chat sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_tool_rounds() -> u32 {
    2
}

fn default_tool_timeout_secs() -> u64 {
    15
}

fn default_enabled_tools() -> Vec<String> {
    vec![
        "check_availability".to_string(),
        "book_appointment".to_string(),
        "fetch_patient_record".to_string(),
    ]
}

fn default_system_instruction() -> String {
    "You are a scheduling assistant for a medical clinic. Help patients check \
     availability and book appointments. Use the provided tools; never invent \
     availability."
        .to_string()
}

fn default_max_sessions() -> usize {
    100
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: default_tool_timeout_secs(),
            enabled_tools: default_enabled_tools(),
            system_instruction: default_system_instruction(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Booking service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Professionals who pre-approve agent bookings get status `scheduled`
    /// instead of `pending_approval`
    #[serde(default)]
    pub auto_approve: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            auto_approve: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_tool_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_tool_rounds".to_string(),
                message: "must be at least 1 to allow tool use".to_string(),
            });
        }

        if self.agent.max_tool_rounds > 8 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_tool_rounds".to_string(),
                message: "cap too high; unbounded tool chains are a protocol violation"
                    .to_string(),
            });
        }

        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gateway.timeout_secs".to_string(),
                message: "gateway calls must have a bounded timeout".to_string(),
            });
        }

        if self.agent.tool_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.tool_timeout_secs".to_string(),
                message: "tool calls must have a bounded timeout".to_string(),
            });
        }

        if self.environment.is_production() && self.gateway.api_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gateway.api_key".to_string(),
                message: "required in production".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Layering, later wins: `config/default.*`, `config/{env}.*`,
/// `config/local.*`, then `CLINIC_AGENT_*` environment variables
/// (`CLINIC_AGENT_SERVER__PORT=9000`).
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if Path::new("config/default.toml").exists() || Path::new("config/default.yaml").exists() {
        builder = builder.add_source(File::with_name("config/default").required(false));
    }

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("CLINIC_AGENT").separator("__"));

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        enabled_tools = settings.agent.enabled_tools.len(),
        "Settings loaded"
    );

    Ok(settings)
}
