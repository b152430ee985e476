//! HTTP endpoints
//!
//! REST API over the agent and the scheduling services. The availability
//! and appointment endpoints hit the services directly; chat goes through
//! the orchestrator.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use clinic_agent_agent::AgentError;
use clinic_agent_persistence::{AppointmentStore, ScheduleStore};
use clinic_agent_scheduling::{compute_slots, BookedSpan, BookingError, BookingOrigin, BookingRequest};
use clinic_agent_tools::CallerContext;

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(delete_session))
        // Chat endpoint
        .route("/api/chat/:session_id", post(chat))
        // Direct scheduling endpoints
        .route("/api/availability", get(availability))
        .route("/api/appointments", post(create_appointment))
        // Health check
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// Disabled means permissive, for development only. With CORS enabled and
/// no valid origins configured, only localhost:3000 is allowed.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!(origins = parsed_origins.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// JSON error body shared by all endpoints
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

fn agent_error_response(err: AgentError) -> Response {
    match err {
        AgentError::SessionNotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("session not found: {}", id))
        }
        AgentError::SessionLimitReached(limit) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("session limit reached: {}", limit),
        ),
        AgentError::Gateway(e) => {
            tracing::error!(error = %e, "Gateway failure");
            error_response(StatusCode::BAD_GATEWAY, "model gateway unavailable")
        }
        AgentError::ProtocolViolation { max_rounds } => {
            tracing::error!(max_rounds, "Model exceeded tool round allowance");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "the assistant could not complete this request",
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    patient_id: Uuid,
    clinic_id: Uuid,
    #[serde(default)]
    staff: bool,
}

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
}

/// Create a chat session bound to the calling patient
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Response {
    let caller = if request.staff {
        CallerContext::staff(request.patient_id, request.clinic_id)
    } else {
        CallerContext::patient(request.patient_id, request.clinic_id)
    };

    match state.sessions.create(caller, state.enabled_tools.clone()) {
        Ok(session_id) => (
            StatusCode::CREATED,
            Json(CreateSessionResponse { session_id }),
        )
            .into_response(),
        Err(e) => agent_error_response(e),
    }
}

/// Delete a session; unknown ids are a no-op
async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    state.sessions.remove(id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

/// One user message through the agent
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let session = match state.sessions.get(session_id) {
        Ok(session) => session,
        Err(e) => return agent_error_response(e),
    };

    let mut session = session.lock().await;
    match state
        .orchestrator
        .converse(&mut session, request.message)
        .await
    {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => agent_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    professional_id: Uuid,
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    professional_id: Uuid,
    date: NaiveDate,
    slots: Vec<String>,
}

/// Free one-hour slots for a professional on a date
async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Response {
    let stored = match state.schedules.get(query.professional_id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("no operating schedule for {}", query.professional_id),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Schedule lookup failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "schedule lookup failed");
        }
    };

    let appointments = match state
        .appointments
        .list_for_professional_on(query.professional_id, query.date)
        .await
    {
        Ok(appointments) => appointments,
        Err(e) => {
            tracing::error!(error = %e, "Appointment lookup failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "appointment lookup failed",
            );
        }
    };

    let booked: Vec<BookedSpan> = appointments
        .iter()
        .filter(|a| a.status.is_consuming())
        .map(|a| BookedSpan::new(a.start_time, a.end_time))
        .collect();
    let slots = compute_slots(&stored.resolve(), query.date, &booked);

    Json(AvailabilityResponse {
        professional_id: query.professional_id,
        date: query.date,
        slots: slots.iter().map(|s| s.to_string()).collect(),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct CreateAppointmentRequest {
    professional_id: Uuid,
    patient_id: Uuid,
    start_time: DateTime<Utc>,
    notes: Option<String>,
    #[serde(default)]
    staff: bool,
}

#[derive(Debug, Serialize)]
struct AppointmentResponse {
    id: Uuid,
    professional_id: Uuid,
    patient_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
}

/// Book an appointment directly, bypassing the agent
async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Response {
    let origin = if request.staff || state.config.booking.auto_approve {
        BookingOrigin::Staff
    } else {
        BookingOrigin::Patient
    };

    let result = state
        .booking
        .book(BookingRequest {
            professional_id: request.professional_id,
            patient_id: request.patient_id,
            start_time: request.start_time,
            notes: request.notes,
            origin,
        })
        .await;

    match result {
        Ok(appointment) => (
            StatusCode::CREATED,
            Json(AppointmentResponse {
                id: appointment.id,
                professional_id: appointment.professional_id,
                patient_id: appointment.patient_id,
                start_time: appointment.start_time,
                end_time: appointment.end_time,
                status: appointment.status.as_str().to_string(),
            }),
        )
            .into_response(),
        Err(BookingError::SlotUnavailable { start_time }) => error_response(
            StatusCode::CONFLICT,
            format!("slot at {} is already taken", start_time),
        ),
        Err(BookingError::InvalidRequest(message)) => {
            error_response(StatusCode::BAD_REQUEST, message)
        }
        Err(BookingError::Storage(e)) => {
            tracing::error!(error = %e, "Booking storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "booking failed")
        }
    }
}

/// Health check
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveTime;
    use clinic_agent_config::Settings;
    use clinic_agent_core::{
        ConversationTurn, DayHours, OperatingSchedule, StoredSchedule, ToolDeclaration,
    };
    use clinic_agent_llm::{GatewayError, GatewayResponse, ModelGateway};
    use tower::ServiceExt;

    struct EchoGateway;

    #[async_trait]
    impl ModelGateway for EchoGateway {
        async fn generate(
            &self,
            history: &[ConversationTurn],
            _system_instruction: &str,
            _tools: &[ToolDeclaration],
        ) -> Result<GatewayResponse, GatewayError> {
            let last = history
                .last()
                .map(|turn| turn.text())
                .unwrap_or_default();
            Ok(GatewayResponse {
                text: Some(format!("echo: {}", last)),
                tool_calls: Vec::new(),
            })
        }
    }

    fn test_state() -> AppState {
        AppState::with_gateway(Settings::default(), std::sync::Arc::new(EchoGateway))
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response.into_response()).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_then_chat() {
        let app = create_router(test_state());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/sessions",
                serde_json::json!({
                    "patient_id": Uuid::new_v4(),
                    "clinic_id": Uuid::new_v4(),
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response.into_response()).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/chat/{}", session_id),
                serde_json::json!({ "message": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response.into_response()).await;
        assert_eq!(body["reply"], "echo: hello");
    }

    #[tokio::test]
    async fn test_chat_unknown_session_is_404() {
        let app = create_router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/chat/{}", Uuid::new_v4()),
                serde_json::json!({ "message": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_availability_endpoint() {
        let state = test_state();
        let professional_id = Uuid::new_v4();

        let open = DayHours::open(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let mut week = OperatingSchedule::closed();
        week.0[1] = open;
        state
            .schedules
            .upsert(professional_id, StoredSchedule::Weekly { week })
            .await
            .unwrap();

        let app = create_router(state);
        // 2026-03-02 is a Monday
        let uri = format!(
            "/api/availability?professional_id={}&date=2026-03-02",
            professional_id
        );
        let response = app
            .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response.into_response()).await;
        assert_eq!(body["slots"], serde_json::json!(["09:00", "10:00", "11:00"]));
    }

    #[tokio::test]
    async fn test_availability_unknown_professional_is_404() {
        let app = create_router(test_state());
        let uri = format!(
            "/api/availability?professional_id={}&date=2026-03-02",
            Uuid::new_v4()
        );
        let response = app
            .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_double_booking_is_conflict() {
        let app = create_router(test_state());
        let professional_id = Uuid::new_v4();
        let body = serde_json::json!({
            "professional_id": professional_id,
            "patient_id": Uuid::new_v4(),
            "start_time": "2026-03-02T10:00:00Z",
        });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/appointments", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = response_json(response.into_response()).await;
        assert_eq!(created["status"], "pending_approval");

        let response = app
            .oneshot(json_request("POST", "/api/appointments", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_off_hour_booking_is_bad_request() {
        let app = create_router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                serde_json::json!({
                    "professional_id": Uuid::new_v4(),
                    "patient_id": Uuid::new_v4(),
                    "start_time": "2026-03-02T10:30:00Z",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_staff_booking_is_scheduled() {
        let app = create_router(test_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/appointments",
                serde_json::json!({
                    "professional_id": Uuid::new_v4(),
                    "patient_id": Uuid::new_v4(),
                    "start_time": "2026-03-02T10:00:00Z",
                    "staff": true,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response.into_response()).await;
        assert_eq!(body["status"], "scheduled");
    }

    #[tokio::test]
    async fn test_delete_session_is_no_content() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::delete(&format!("/api/sessions/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
