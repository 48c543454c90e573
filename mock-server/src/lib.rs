//! In-process stand-in for the Avisa App API.
//!
//! Serves the seven endpoints the adapter uses with the provider's real
//! quirks: bearer-token checks answer 401, missing body fields answer 400
//! with a `message`, and the number check answers 400 with a meaningful body
//! for numbers that are not on WhatsApp. Every call is logged in arrival
//! order together with the number of calls in flight at that moment, so
//! tests can assert on ordering and overlap.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "test-token";
pub const REGISTERED_NUMBER: &str = "5511999999999";
pub const FAILING_NUMBER: &str = "5500000000500";

/// Behavior knobs for the mock.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub token: String,
    /// Numbers the number check reports as WhatsApp users.
    pub registered_numbers: HashSet<String>,
    /// Numbers that make any endpoint answer 500.
    pub failing_numbers: HashSet<String>,
    /// Artificial delay per call.
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            registered_numbers: HashSet::from([REGISTERED_NUMBER.to_string()]),
            failing_numbers: HashSet::from([FAILING_NUMBER.to_string()]),
            latency: Duration::ZERO,
        }
    }
}

/// One request as the mock saw it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
    /// Calls in flight when this one arrived, itself included.
    pub concurrent: usize,
}

#[derive(Debug, Default)]
pub struct MockState {
    config: MockConfig,
    calls: RwLock<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            calls: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Highest number of simultaneous calls observed.
    pub async fn max_concurrency(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .map(|c| c.concurrent)
            .max()
            .unwrap_or(0)
    }
}

pub type SharedState = Arc<MockState>;

#[derive(Debug, Clone, Copy)]
enum Route {
    SendMessage,
    SendDocument,
    SendImage,
    SendMedia,
    CheckNumber,
    InstanceStatus,
    InstanceQr,
}

impl Route {
    fn path(self) -> &'static str {
        match self {
            Route::SendMessage => "/actions/sendMessage",
            Route::SendDocument => "/actions/sendDocument",
            Route::SendImage => "/actions/sendImage",
            Route::SendMedia => "/actions/sendMedia",
            Route::CheckNumber => "/actions/checknumberinternational",
            Route::InstanceStatus => "/instance/status",
            Route::InstanceQr => "/instance/qr",
        }
    }

    fn required_fields(self) -> &'static [&'static str] {
        match self {
            Route::SendMessage => &["numero", "mensagem"],
            Route::SendDocument => &["number", "document", "fileName"],
            Route::SendImage => &["number", "image"],
            Route::SendMedia => &["numero", "urlFile", "type", "fileName"],
            Route::CheckNumber => &["numero"],
            Route::InstanceStatus | Route::InstanceQr => &[],
        }
    }

    /// Body field carrying the phone number.
    fn number_field(self) -> Option<&'static str> {
        match self {
            Route::SendMessage | Route::SendMedia | Route::CheckNumber => Some("numero"),
            Route::SendDocument | Route::SendImage => Some("number"),
            Route::InstanceStatus | Route::InstanceQr => None,
        }
    }
}

pub fn app() -> Router {
    app_with_state(Arc::new(MockState::new(MockConfig::default())))
}

pub fn app_with_state(state: SharedState) -> Router {
    Router::new()
        .route("/actions/sendMessage", post(send_message))
        .route("/actions/sendDocument", post(send_document))
        .route("/actions/sendImage", post(send_image))
        .route("/actions/sendMedia", post(send_media))
        .route("/actions/checknumberinternational", post(check_number))
        .route("/instance/status", get(instance_status))
        .route("/instance/qr", get(instance_qr))
        .with_state(state)
}

pub async fn run_with_state(listener: TcpListener, state: SharedState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

type Reply = (StatusCode, Json<Value>);

async fn send_message(State(state): State<SharedState>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    serve(&state, Route::SendMessage, &headers, Some(body)).await
}

async fn send_document(State(state): State<SharedState>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    serve(&state, Route::SendDocument, &headers, Some(body)).await
}

async fn send_image(State(state): State<SharedState>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    serve(&state, Route::SendImage, &headers, Some(body)).await
}

async fn send_media(State(state): State<SharedState>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    serve(&state, Route::SendMedia, &headers, Some(body)).await
}

async fn check_number(State(state): State<SharedState>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    serve(&state, Route::CheckNumber, &headers, Some(body)).await
}

async fn instance_status(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    serve(&state, Route::InstanceStatus, &headers, None).await
}

async fn instance_qr(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    serve(&state, Route::InstanceQr, &headers, None).await
}

/// Decrements the in-flight counter when a call finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn serve(state: &MockState, route: Route, headers: &HeaderMap, body: Option<Value>) -> Reply {
    let concurrent = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    let _guard = InFlight(&state.in_flight);

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.calls.write().await.push(RecordedCall {
        path: route.path().to_string(),
        authorization: authorization.clone(),
        body: body.clone(),
        concurrent,
    });
    debug!(path = route.path(), concurrent, "mock call");

    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }

    let expected = format!("Bearer {}", state.config.token);
    if authorization.as_deref() != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"})));
    }

    let body = body.unwrap_or(Value::Null);
    if let Some(field) = route
        .required_fields()
        .iter()
        .find(|f| !body.get(**f).is_some_and(Value::is_string))
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Bad Request", "message": format!("{field} is required")})),
        );
    }

    let number = route
        .number_field()
        .and_then(|f| body.get(f))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if state.config.failing_numbers.contains(number) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Internal Server Error"})),
        );
    }

    match route {
        Route::SendMessage | Route::SendDocument | Route::SendImage | Route::SendMedia => (
            StatusCode::OK,
            Json(json!({
                "status": true,
                "message": "Message sent",
                "id": Uuid::new_v4(),
                "to": number,
            })),
        ),
        Route::CheckNumber if state.config.registered_numbers.contains(number) => (
            StatusCode::OK,
            Json(json!({"numero": number, "exists": true, "jid": format!("{number}@s.whatsapp.net")})),
        ),
        Route::CheckNumber => (
            StatusCode::BAD_REQUEST,
            Json(json!({"numero": number, "exists": false, "message": "number is not on WhatsApp"})),
        ),
        Route::InstanceStatus => (
            StatusCode::OK,
            Json(json!({"status": "connected", "instance": "mock"})),
        ),
        Route::InstanceQr => (
            StatusCode::OK,
            Json(json!({"qrcode": "data:image/png;base64,iVBORw0KGgo="})),
        ),
    }
}
