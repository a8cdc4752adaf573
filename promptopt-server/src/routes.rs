//! HTTP routes for the optimizer endpoint.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use promptopt_core::{
    run_optimizer, ExampleSet, GatewayConfig, OpenAiGateway, OptimizerConfig,
};
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Shared server state: everything needed to build a gateway per request.
pub struct AppState {
    pub api_key: String,
    pub gateway_config: GatewayConfig,
    pub optimizer_defaults: OptimizerConfig,
}

/// Response body for a completed optimization.
#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub optimized_prompt: String,
    pub iterations_completed: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error envelope returned for failed requests.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/optimize/upload", post(optimize_with_csv_upload))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": 200 }))
}

/// Fields collected from the multipart form.
#[derive(Debug, Default)]
struct UploadForm {
    csv: Option<Vec<u8>>,
    system_prompt: Option<String>,
    iterations: Option<usize>,
    chunk_size: Option<usize>,
}

/// Accept a CSV upload plus form parameters and return an optimized prompt.
async fn optimize_with_csv_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                if field.content_type() != Some("text/csv") {
                    return Err(ApiError::bad_request(
                        "Invalid file type. Please upload a CSV file.",
                    ));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                form.csv = Some(bytes.to_vec());
            }
            "system_prompt" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid system_prompt: {e}")))?;
                form.system_prompt = Some(text);
            }
            "iterations" => {
                form.iterations = Some(parse_field(field, "iterations").await?);
            }
            "chunk_size" => {
                form.chunk_size = Some(parse_field(field, "chunk_size").await?);
            }
            other => {
                log::debug!("Ignoring unknown form field `{other}`");
            }
        }
    }

    let csv = form
        .csv
        .ok_or_else(|| ApiError::bad_request("Missing `file` field"))?;
    let system_prompt = validate_system_prompt(form.system_prompt.as_deref())?;

    let defaults = &state.optimizer_defaults;
    let config = OptimizerConfig {
        max_iterations: form.iterations.unwrap_or(defaults.max_iterations),
        chunk_size: form.chunk_size.unwrap_or(defaults.chunk_size),
        ..defaults.clone()
    };
    let iterations_completed = config.max_iterations;

    let mut examples = ExampleSet::from_csv_reader(Cursor::new(csv))
        .map_err(|e| ApiError::bad_request(format!("Failed to parse CSV: {e}")))?;

    let gateway = Arc::new(OpenAiGateway::new(
        state.api_key.clone(),
        state.gateway_config.clone(),
    ));

    let optimized_prompt = run_optimizer(gateway, &system_prompt, &mut examples, config)
        .await
        .map_err(|e| ApiError::internal(format!("An error occurred during optimization: {e}")))?;

    Ok(Json(OptimizeResponse {
        optimized_prompt,
        iterations_completed,
        success: true,
        message: None,
    }))
}

/// Parse a numeric form field.
async fn parse_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<usize, ApiError> {
    let text = field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {name}: {e}")))?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {name}: `{text}`")))
}

/// Require a non-empty system prompt.
fn validate_system_prompt(prompt: Option<&str>) -> Result<String, ApiError> {
    match prompt.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        Some(_) => Err(ApiError::bad_request("System prompt cannot be empty")),
        None => Err(ApiError::bad_request("Missing `system_prompt` field")),
    }
}
