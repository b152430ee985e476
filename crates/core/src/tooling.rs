//! Tool-calling contracts
//!
//! Wire-level types shared by the model gateway, the tool registry and the
//! orchestrator: tool-call requests, paired results, and the JSON-schema
//! subset used for tool declarations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation requested by the model
///
/// Produced only by the model gateway, never by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Declared tool name
    pub name: String,
    /// JSON-typed arguments, keyed by parameter name
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: serde_json::Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Classification of a failed tool invocation
///
/// `SlotUnavailable` is an expected, recoverable booking-contention outcome
/// and must stay distinguishable from generic execution failures so the
/// model can prompt for another slot instead of apologizing generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Malformed, missing or disallowed arguments (includes unknown tools)
    Validation,
    /// The tool ran and failed (RPC failure, timeout, storage error)
    Execution,
    /// The requested hour bucket is already taken
    SlotUnavailable,
}

/// Payload of a tool result: success value or error descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResultPayload {
    Success { result: Value },
    Error { kind: ToolErrorKind, message: String },
}

impl ToolResultPayload {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResultPayload::Success { .. })
    }
}

/// The outcome of one tool invocation
///
/// Always paired 1:1 with a preceding [`ToolCallRequest`] in the same
/// logical exchange, and appended to the history before the next gateway
/// call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was invoked
    pub name: String,
    /// Success result or error descriptor
    pub payload: ToolResultPayload,
}

impl ToolResult {
    /// Successful result
    pub fn success(name: impl Into<String>, result: Value) -> Self {
        Self {
            name: name.into(),
            payload: ToolResultPayload::Success { result },
        }
    }

    /// Error result
    pub fn error(name: impl Into<String>, kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: ToolResultPayload::Error {
                kind,
                message: message.into(),
            },
        }
    }
}

/// Schema for a single tool parameter (JSON-schema subset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    /// JSON type name ("string", "number", "boolean", ...)
    #[serde(rename = "type")]
    pub type_name: String,
    /// Human-readable description shown to the model
    pub description: String,
}

impl PropertySchema {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            type_name: "string".to_string(),
            description: description.into(),
        }
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self {
            type_name: "number".to_string(),
            description: description.into(),
        }
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self {
            type_name: "boolean".to_string(),
            description: description.into(),
        }
    }
}

/// Parameter object schema for a tool declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchema {
    /// Always "object" for tool parameters
    #[serde(rename = "type")]
    pub type_name: String,
    /// Parameter name to schema
    pub properties: serde_json::Map<String, Value>,
    /// Names of required parameters
    pub required: Vec<String>,
}

impl InputSchema {
    /// Start an empty object schema
    pub fn object() -> Self {
        Self {
            type_name: "object".to_string(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a property; marks it required when `required` is true
    pub fn property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        // PropertySchema serialization is infallible (two string fields)
        if let Ok(value) = serde_json::to_value(&schema) {
            self.properties.insert(name.to_string(), value);
        }
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Whether `name` is a declared property
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Declared JSON type of `name`, if any
    pub fn property_type(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|p| p.get("type"))
            .and_then(|t| t.as_str())
    }
}

/// Declaration of a tool sent to the model gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool name the model uses in call requests
    pub name: String,
    /// What the tool does, shown to the model
    pub description: String,
    /// Parameter contract (JSON-schema subset)
    pub parameters: InputSchema,
}
