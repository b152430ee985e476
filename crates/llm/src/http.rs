//! HTTP model gateway
//!
//! Speaks the gateway's JSON contract: POST the conversation contents
//! plus an optional config block carrying the system instruction and the
//! tool declarations; read back either a candidate content turn, a list
//! of function calls, or both. Non-2xx responses carry `{ "error": ... }`
//! and surface as [`GatewayError::Api`], distinct from tool-level
//! failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use clinic_agent_core::{
    ConversationTurn, ToolCallRequest, ToolDeclaration, ToolResultPayload, TurnPart, TurnRole,
};

use crate::gateway::{GatewayResponse, ModelGateway};
use crate::GatewayError;

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API endpoint base URL
    pub endpoint: String,
    /// API key sent as `x-api-key` when non-empty
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpGatewayConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of [`ModelGateway`]
pub struct HttpModelGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpModelGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        if config.endpoint.is_empty() {
            return Err(GatewayError::Configuration(
                "gateway endpoint not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn convert_history(history: &[ConversationTurn]) -> Vec<WireContent> {
        history.iter().map(WireContent::from_turn).collect()
    }

    fn parse_response(response: WireResponse) -> Result<GatewayResponse, GatewayError> {
        let text = response.candidate_content.map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        });

        let tool_calls = response
            .function_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = match call.args {
                    Value::Object(map) => map,
                    Value::Null => serde_json::Map::new(),
                    other => {
                        return Err(GatewayError::InvalidResponse(format!(
                            "function call arguments must be an object, got {}",
                            other
                        )))
                    }
                };
                Ok(ToolCallRequest::new(call.name, arguments))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if text.as_deref().map_or(true, str::is_empty) && tool_calls.is_empty() {
            return Err(GatewayError::InvalidResponse(
                "response carried neither text nor function calls".to_string(),
            ));
        }

        Ok(GatewayResponse { text, tool_calls })
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        system_instruction: &str,
        tools: &[ToolDeclaration],
    ) -> Result<GatewayResponse, GatewayError> {
        let request = WireRequest {
            model: self.config.model.clone(),
            contents: Self::convert_history(history),
            config: Some(WireRequestConfig {
                system_instruction: system_instruction.to_string(),
                tools: if tools.is_empty() {
                    None
                } else {
                    Some(vec![WireToolGroup {
                        function_declarations: tools.to_vec(),
                    }])
                },
            }),
        };

        tracing::debug!(
            turns = history.len(),
            tools = tools.len(),
            model = %self.config.model,
            "Calling model gateway"
        );

        let mut builder = self
            .client
            .post(format!("{}/v1/generate", self.config.endpoint))
            .header("content-type", "application/json");
        if !self.config.api_key.is_empty() {
            builder = builder.header("x-api-key", &self.config.api_key);
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.config.timeout.as_secs())
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GatewayError::Api(format!("HTTP {}: {}", status, message)));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Self::parse_response(wire)
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    model: String,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<WireRequestConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequestConfig {
    system_instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireToolGroup>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolGroup {
    function_declarations: Vec<ToolDeclaration>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    role: String,
    parts: Vec<WirePart>,
}

impl WireContent {
    fn from_turn(turn: &ConversationTurn) -> Self {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "model",
            TurnRole::Tool => "tool",
        };
        Self {
            role: role.to_string(),
            parts: turn.parts.iter().map(WirePart::from_part).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

impl WirePart {
    fn from_part(part: &TurnPart) -> Self {
        match part {
            TurnPart::Text { text } => Self {
                text: Some(text.clone()),
                ..Default::default()
            },
            TurnPart::ToolCall(call) => Self {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: Value::Object(call.arguments.clone()),
                }),
                ..Default::default()
            },
            TurnPart::ToolResult(result) => {
                let response = match &result.payload {
                    ToolResultPayload::Success { result } => result.clone(),
                    ToolResultPayload::Error { kind, message } => serde_json::json!({
                        "error": { "kind": kind, "message": message }
                    }),
                };
                Self {
                    function_response: Some(WireFunctionResponse {
                        name: result.name.clone(),
                        response,
                    }),
                    ..Default::default()
                }
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    candidate_content: Option<WireContent>,
    function_calls: Option<Vec<WireFunctionCall>>,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: String,
}
