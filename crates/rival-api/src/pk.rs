//! Handler for `GET /pk?a=<keyword>&b=<keyword>`.
//!
//! Both keywords go through [`resolve_side`] against one snapshot; the
//! response carries the structured result plus the rendered lines and
//! summary.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use rival_core::{
  Error,
  pk::{Comparator, EventDuel, HeadToHead, Side},
  resolve::resolve_side,
  store::CorpusStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  worker::{Corpus, run_search},
};

#[derive(Debug, Deserialize)]
pub struct PkParams {
  pub a: String,
  pub b: String,
}

#[derive(Debug, Serialize)]
pub struct PkResponse {
  #[serde(flatten)]
  pub result:  HeadToHead,
  pub lines:   Vec<String>,
  pub summary: String,
}

/// `GET /pk?a=<keyword>&b=<keyword>`
pub async fn handler<S>(
  State(corpus): State<Arc<Corpus<S>>>,
  Query(params): Query<PkParams>,
) -> Result<Json<PkResponse>, ApiError>
where
  S: CorpusStore + 'static,
{
  let store = Arc::new(corpus.current().await.snapshot().await.map_err(Error::store)?);
  let a = resolve_side(store.as_ref(), Side::A, &params.a).await?;
  let b = resolve_side(store.as_ref(), Side::B, &params.b).await?;

  let comparator = Comparator::new(store);
  let result = run_search(corpus.options().timeout, async move {
    comparator.compare(&a.id, &b.id).await
  })
  .await?;

  Ok(Json(PkResponse {
    lines: result.events.iter().map(EventDuel::line).collect(),
    summary: result.summary(),
    result,
  }))
}
