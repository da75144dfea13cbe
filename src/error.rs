//! Error types surfaced by the HTTP/WebSocket layer.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;

use crate::protocol::ErrorOut;

/// Malformed persisted state, naming the offending field path.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid interaction state at `{path}`: {message}")]
pub struct ValidationError {
  pub path: String,
  pub message: String,
}

impl ValidationError {
  pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self { path: path.into(), message: message.into() }
  }
}

#[derive(Error, Debug)]
pub enum AppError {
  #[error("Unknown exerciseId: {0}")]
  UnknownExercise(String),

  #[error("Unknown sessionId: {0}")]
  UnknownSession(String),

  #[error(transparent)]
  InvalidState(#[from] ValidationError),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match self {
      AppError::UnknownExercise(_) | AppError::UnknownSession(_) => StatusCode::NOT_FOUND,
      AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorOut { message: self.to_string() })).into_response()
  }
}
