//! Server-side callable over HTTP.
//!
//! Keeps the model credential on the server. The callable has its own short
//! prompt table ([`build_callable_prompt`]) and returns the raw model text.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/analyzeCode` | `{"data": {"code", "mode"}}` or `{"code", "mode"}` → `{"result"}` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "status": "INVALID_ARGUMENT", "message": "..." } }
//! ```
//!
//! `INVALID_ARGUMENT` is returned with 400, `INTERNAL` with 500.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::ai::{ModelClient, build_callable_prompt};
use crate::config::Config;

const MISSING_ARGUMENTS: &str = "The function must be called with \"code\" and \"mode\" arguments.";
const KEY_NOT_CONFIGURED: &str = "API Key not configured.";
const CALL_FAILED: &str = "Failed to analyze code.";
const NO_RESPONSE: &str = "No response.";

#[derive(Clone)]
struct AppState {
    model: ModelClient,
}

/// Build the callable router around `model`
pub fn router(model: ModelClient) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyzeCode", post(handle_analyze_code))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { model })
}

/// Serve the callable on `config.server.bind` until the process exits.
pub async fn run_server(config: &Config, model: ModelClient) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(model);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Callable listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    status: &'static str,
    message: String,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                status: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn invalid_argument(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "INVALID_ARGUMENT",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "INTERNAL",
        message: message.into(),
    }
}

// ============ POST /analyzeCode ============

#[derive(Debug, Serialize)]
struct CallableResponse {
    result: String,
}

/// Pull non-empty `code` and `mode` strings from the (optionally
/// `data`-wrapped) payload.
fn extract_arguments(body: &[u8]) -> Option<(String, String)> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    let args = match payload.get("data") {
        Some(data) if data.is_object() => data,
        _ => &payload,
    };

    let field = |name: &str| {
        args.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some((field("code")?, field("mode")?))
}

async fn handle_analyze_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CallableResponse>, AppError> {
    let (code, mode) = extract_arguments(&body).ok_or_else(|| invalid_argument(MISSING_ARGUMENTS))?;

    let ModelClient::Configured(provider) = &state.model else {
        return Err(internal(KEY_NOT_CONFIGURED));
    };

    debug!("Callable request: mode={}, {} chars", mode, code.len());
    let request = build_callable_prompt(&code, &mode);
    let response = provider.generate(&request).await.map_err(|e| {
        error!("Callable model call failed: {}", e);
        internal(CALL_FAILED)
    })?;

    let result = if response.text.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        response.text
    };
    Ok(Json(CallableResponse { result }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::client::tests::MockProvider;
    use crate::types::ErrorCategory;
    use std::sync::atomic::Ordering;

    async fn call(model: ModelClient, body: &str) -> (StatusCode, Value) {
        let response = match handle_analyze_code(
            State(AppState { model }),
            Bytes::from(body.to_string()),
        )
        .await
        {
            Ok(json) => json.into_response(),
            Err(err) => err.into_response(),
        };
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_wrapped_and_bare_payloads() {
        for body in [
            r#"{"data":{"code":"x()","mode":"Find Bugs"}}"#,
            r#"{"code":"x()","mode":"Find Bugs"}"#,
        ] {
            let mock = MockProvider::replying("Found one.");
            let requests = mock.requests.clone();
            let (status, json) = call(ModelClient::with_provider(mock), body).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(json, serde_json::json!({"result": "Found one."}));
            let sent = requests.lock().unwrap()[0].clone();
            assert_eq!(sent.prompt, "Find bugs in this code:\n\nx()");
            assert!(sent.system_instruction.ends_with(" Focus on security and correctness."));
        }
    }

    #[tokio::test]
    async fn test_missing_arguments_are_invalid() {
        for body in [
            r#"{"data":{"code":"x()"}}"#,
            r#"{"data":{"code":"","mode":"Explain Code"}}"#,
            r#"{"code":42,"mode":"Explain Code"}"#,
            "not json",
        ] {
            let mock = MockProvider::replying("unused");
            let calls = mock.calls.clone();
            let (status, json) = call(ModelClient::with_provider(mock), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"]["status"], "INVALID_ARGUMENT");
            assert_eq!(json["error"]["message"], MISSING_ARGUMENTS);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_internal() {
        let (status, json) = call(
            ModelClient::Unconfigured,
            r#"{"data":{"code":"x()","mode":"Explain Code"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["status"], "INTERNAL");
        assert_eq!(json["error"]["message"], KEY_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_model_failure_is_internal() {
        let mock = MockProvider::failing(ErrorCategory::Transient);
        let (status, json) = call(
            ModelClient::with_provider(mock),
            r#"{"data":{"code":"x()","mode":"Explain Code"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], CALL_FAILED);
    }

    #[tokio::test]
    async fn test_empty_text_becomes_placeholder() {
        let (status, json) = call(
            ModelClient::with_provider(MockProvider::replying("")),
            r#"{"data":{"code":"x()","mode":"Refactor"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(health) = handle_health().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
