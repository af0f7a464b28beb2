use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use debrief_service::{
	CrmDataResponse, QuestionAnswerResponse, ServiceError, TaskDataResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/crm-data", post(crm_data))
		.route("/task-data", post(task_data))
		.route("/question-answer-data", post(question_answer_data))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct VectorIdRequest {
	pub vector_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MeetingNotesRequest {
	#[serde(default)]
	pub meeting_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
	pub question: String,
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "online" }))
}

async fn crm_data(
	State(state): State<AppState>,
	Json(payload): Json<VectorIdRequest>,
) -> Result<Json<CrmDataResponse>, ApiError> {
	let response = state.service.extract_crm_data(&payload.vector_id).await?;
	Ok(Json(response))
}

async fn task_data(
	State(state): State<AppState>,
	Json(payload): Json<MeetingNotesRequest>,
) -> Result<Json<TaskDataResponse>, ApiError> {
	let response = state.service.prioritize_tasks(payload.meeting_notes.as_deref()).await?;
	Ok(Json(response))
}

async fn question_answer_data(
	State(state): State<AppState>,
	Json(payload): Json<QuestionRequest>,
) -> Result<Json<QuestionAnswerResponse>, ApiError> {
	if payload.question.trim().is_empty() {
		return Err(json_error(
			StatusCode::UNPROCESSABLE_ENTITY,
			"invalid_request",
			"question must be non-empty.",
			Some(vec!["$.question".to_string()]),
		));
	}

	let response = state.service.answer_question(&payload.question).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self {
			status,
			error_code: error_code.into(),
			message: message.into(),
			fields,
		}
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::NotFound { meeting_id } => json_error(
				StatusCode::NOT_FOUND,
				"not_found",
				format!("Meeting '{meeting_id}' was not found in the index."),
				None,
			),
			ServiceError::EmptyContext { message } => {
				json_error(StatusCode::NOT_FOUND, "empty_context", message, None)
			},
			ServiceError::InvalidRequest { message } => {
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", message, None)
			},
			ServiceError::Provider { message } => {
				json_error(StatusCode::BAD_GATEWAY, "upstream_failure", message, None)
			},
			ServiceError::Index { message } => {
				json_error(StatusCode::BAD_GATEWAY, "upstream_failure", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};
		(self.status, Json(body)).into_response()
	}
}
