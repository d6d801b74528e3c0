use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use savor_service::{
	PipelineDebugBundle, RecommendError, RecommendRequest, RecommendResponse, ServiceError,
	TurnRequest, TurnResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/chat/turn", post(turn))
		.route("/v1/recommend", post(recommend))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn turn(
	State(state): State<AppState>,
	Json(payload): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
	let response = state.service.advance_turn(payload).await?;

	Ok(Json(response))
}

async fn recommend(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state.service.recommend(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
	error_code: String,
	message: String,
	retryable: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	debug_data: Option<PipelineDebugBundle>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	retryable: bool,
	debug_data: Option<PipelineDebugBundle>,
}

fn classify(err: &ServiceError) -> (StatusCode, &'static str, bool) {
	match err {
		ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request", false),
		ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "upstream_unavailable", true),
		ServiceError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", true),
		ServiceError::Corpus { .. } => (StatusCode::SERVICE_UNAVAILABLE, "corpus_unavailable", true),
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code, retryable) = classify(&err);

		Self { status, error_code, message: err.to_string(), retryable, debug_data: None }
	}
}

impl From<RecommendError> for ApiError {
	fn from(err: RecommendError) -> Self {
		let (status, error_code, retryable) = classify(&err.source);

		Self {
			status,
			error_code,
			message: err.source.to_string(),
			retryable,
			// Whatever part of the bundle survived the failing stage still
			// goes back for diagnosis.
			debug_data: err.debug_data,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code.to_string(),
			message: self.message,
			retryable: self.retryable,
			debug_data: self.debug_data,
		};

		(self.status, Json(body)).into_response()
	}
}
