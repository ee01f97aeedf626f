//! Handler for `GET /nemesis/{id}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use rival_core::{
  nemesis::{NemesisReport, NemesisSearch},
  store::CorpusStore,
};

use crate::{
  error::ApiError,
  worker::{Corpus, run_search},
};

/// `GET /nemesis/{id}`: everyone better than `id` in all of their events.
pub async fn handler<S>(
  State(corpus): State<Arc<Corpus<S>>>,
  Path(id): Path<String>,
) -> Result<Json<NemesisReport>, ApiError>
where
  S: CorpusStore + 'static,
{
  let options = corpus.options();
  let search = NemesisSearch::new(corpus.current().await).with_policy(options.policy);
  let report = run_search(options.timeout, async move { search.query(&id).await }).await?;
  Ok(Json(report))
}
