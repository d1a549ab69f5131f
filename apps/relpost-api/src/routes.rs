use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{Html, IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use relpost_service::{Error as ServiceError, PageContext, RelatedItem};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
	pub items: Vec<RelatedItem>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
	pub context: PageContext,
	#[serde(default)]
	pub content: String,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/items/{item_id}/related", get(related))
		.route("/v1/items/{item_id}/related/render", get(render_item))
		.route("/v1/render", post(render))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn related(
	State(state): State<AppState>,
	Path(item_id): Path<i64>,
) -> Result<Json<RelatedResponse>, ApiError> {
	let items = state.service.related_for_item(item_id).await?;

	Ok(Json(RelatedResponse { items }))
}

async fn render_item(
	State(state): State<AppState>,
	Path(item_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
	let ctx = state.service.page_context(item_id).await?;

	Ok(Html(state.service.render_related(&ctx).await))
}

async fn render(
	State(state): State<AppState>,
	Json(payload): Json<RenderRequest>,
) -> Html<String> {
	Html(state.embeds.expand(&payload.content, &payload.context).await)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Content store request failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "Internal error.")
			},
			ServiceError::Cache { message } => {
				tracing::error!(error = %message, "Cache request failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "cache_error", "Internal error.")
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

