//! API error type and [`axum::response::IntoResponse`] implementation.

use std::time::Duration;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rival_core::{person::Person, pk::Side};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A keyword matched several persons; the body lists them and, for a
  /// comparison, names the side.
  #[error("{message}")]
  Ambiguous {
    message:    String,
    side:       Option<Side>,
    candidates: Vec<Person>,
  },

  #[error("no comparable records")]
  NoComparableRecords,

  #[error("search timed out after {0:?}")]
  Timeout(Duration),

  #[error("search task failed: {0}")]
  Worker(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rival_core::Error> for ApiError {
  fn from(err: rival_core::Error) -> Self {
    use rival_core::Error;
    match err {
      Error::NotFound(_) | Error::PersonNotFound(..) => {
        ApiError::NotFound(err.to_string())
      }
      Error::Ambiguous { side, ref candidates, .. } => ApiError::Ambiguous {
        message: err.to_string(),
        side,
        candidates: candidates.clone(),
      },
      Error::NoComparableRecords => ApiError::NoComparableRecords,
      Error::StoreUnavailable(source) => ApiError::Store(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Ambiguous { .. } => StatusCode::CONFLICT,
      ApiError::NoComparableRecords => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Worker(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = match &self {
      ApiError::Ambiguous { message, side, candidates } => {
        json!({ "error": message, "side": side, "candidates": candidates })
      }
      other => json!({ "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}
