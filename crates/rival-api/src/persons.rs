//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons?q=<keyword>` | Id or name fragment; at most 100 results |
//! | `GET`  | `/persons/{id}` | 404 if not found |
//! | `GET`  | `/persons/{id}/records` | Personal records with rank badges |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use rival_core::{
  person::Person,
  profile::{self, Profile},
  store::CorpusStore,
};
use serde::Deserialize;

use crate::{error::ApiError, worker::Corpus};

#[derive(Debug, Deserialize)]
pub struct FindParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /persons?q=<keyword>`
pub async fn find<S>(
  State(corpus): State<Arc<Corpus<S>>>,
  Query(params): Query<FindParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: CorpusStore,
{
  let keyword = params.q.trim();
  if keyword.is_empty() {
    return Err(ApiError::BadRequest("missing query parameter q".into()));
  }
  let persons = corpus
    .current()
    .await
    .find_persons(keyword)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(persons))
}

/// `GET /persons/{id}`
pub async fn get_one<S>(
  State(corpus): State<Arc<Corpus<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Person>, ApiError>
where
  S: CorpusStore,
{
  corpus
    .current()
    .await
    .get_person(&id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("person not found: {id}")))
}

/// `GET /persons/{id}/records`
pub async fn records<S>(
  State(corpus): State<Arc<Corpus<S>>>,
  Path(id): Path<String>,
) -> Result<Json<Profile>, ApiError>
where
  S: CorpusStore,
{
  let store = corpus.current().await;
  Ok(Json(profile::profile(store.as_ref(), &id).await?))
}
