//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_exercises(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let exercises: Vec<ExerciseOut> = state.list_exercises().await.iter().map(exercise_out).collect();
  Json(exercises)
}

#[instrument(level = "info", skip(state, body), fields(%body.exercise_id, restored = body.state.is_some()))]
pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> Result<Json<SessionOut>, AppError> {
  let out = start_session(&state, &body.exercise_id, body.state.as_ref(), body.card_order.as_deref()).await?;
  info!(target: "interaction", session_id = %out.session_id, exercise_id = %out.exercise_id, "HTTP session started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, AppError> {
  Ok(Json(get_session(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(direction = %body.direction))]
pub async fn http_post_swipe(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<SwipeIn>,
) -> Result<Json<SessionOut>, AppError> {
  let out = swipe(&state, &session_id, body.direction).await?;
  info!(target: "interaction", %session_id, applied = ?out.applied, score = out.score, "HTTP swipe handled");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(direction = %body.direction))]
pub async fn http_post_wrong_swipe(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<SwipeIn>,
) -> Result<Json<SessionOut>, AppError> {
  Ok(Json(track_wrong_swipe(&state, &session_id, body.direction).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, AppError> {
  Ok(Json(reset_session(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
  end_session(&state, &session_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_review(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<ReviewOut>, AppError> {
  let review = review_session(&state, &session_id).await?;
  info!(target: "interaction", %session_id, score = review.score, completed = review.is_completed, "HTTP review served");
  Ok(Json(review))
}
