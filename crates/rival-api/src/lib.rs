//! JSON REST API for Rival.
//!
//! Exposes an axum [`Router`] backed by any [`rival_core::store::CorpusStore`].
//! Searches run on worker tasks under the deadline in [`SearchOptions`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let corpus = Arc::new(Corpus::new(store, SearchOptions::default()));
//! .nest("/api", rival_api::api_router(corpus))
//! ```

pub mod error;
pub mod nemesis;
pub mod persons;
pub mod pk;
pub mod worker;

use std::sync::Arc;

use axum::{Router, routing::get};
use rival_core::store::CorpusStore;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use worker::{Corpus, SearchOptions};

/// Build the API router for `corpus`.
pub fn api_router<S>(corpus: Arc<Corpus<S>>) -> Router<()>
where
  S: CorpusStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::find::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>))
    .route("/persons/{id}/records", get(persons::records::<S>))
    // Searches
    .route("/nemesis/{id}", get(nemesis::handler::<S>))
    .route("/pk", get(pk::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(corpus)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use rival_core::{
    event::{Event, FormatTag},
    memory::MemoryStore,
    person::{Country, Person},
    record::{RankKind, RankRecord},
  };
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  fn person(id: &str, name: &str, country: &str) -> Person {
    Person {
      id:         id.to_owned(),
      name:       name.to_owned(),
      country_id: Some(country.to_owned()),
    }
  }

  fn corpus() -> Arc<Corpus<MemoryStore>> {
    let store = MemoryStore::builder()
      .event(Event { id: "333".into(), name: "3x3x3".into(), format: FormatTag::Time, rank: 1 })
      .event(Event { id: "222".into(), name: "2x2x2".into(), format: FormatTag::Time, rank: 2 })
      .country(Country { id: "Spain".into(), continent_id: "_Europe".into(), iso2: None })
      .country(Country { id: "Peru".into(), continent_id: "_South America".into(), iso2: None })
      .person(person("2015ALBA01", "Alba Ruiz", "Spain"))
      .person(person("2016BRUN01", "Bruno Diaz", "Peru"))
      .person(person("2017CARL01", "Carla Diaz", "Spain"))
      .record(RankKind::Single, RankRecord::new("2015ALBA01", "333", 900))
      .record(RankKind::Single, RankRecord::new("2015ALBA01", "222", 300))
      .record(RankKind::Single, RankRecord::new("2016BRUN01", "333", 700))
      .record(RankKind::Single, RankRecord::new("2016BRUN01", "222", 250))
      .record(RankKind::Single, RankRecord::new("2017CARL01", "333", 800))
      .build();
    Arc::new(Corpus::new(store, SearchOptions::default()))
  }

  async fn get_json(corpus: Arc<Corpus<MemoryStore>>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(corpus).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── Persons ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn find_persons_by_name() {
    let (status, body) = get_json(corpus(), "/persons?q=diaz").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["name"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["Bruno Diaz", "Carla Diaz"]);
  }

  #[tokio::test]
  async fn find_persons_requires_query() {
    let (status, body) = get_json(corpus(), "/persons").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn get_person_404() {
    let (status, _) = get_json(corpus(), "/persons/2015ALBA01").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get_json(corpus(), "/persons/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "person not found: nobody");
  }

  #[tokio::test]
  async fn records_lists_entries() {
    let (status, body) = get_json(corpus(), "/persons/2016BRUN01/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["entries"][0]["event_id"], "333");
  }

  // ── Nemesis ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn nemesis_report() {
    let (status, body) = get_json(corpus(), "/nemesis/2015ALBA01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["world"].as_array().unwrap().len(), 1);
    assert_eq!(body["world"][0]["id"], "2016BRUN01");
    assert_eq!(body["continent"], "Europe");
    assert!(body["country"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn nemesis_unknown_id_is_404() {
    let (status, _) = get_json(corpus(), "/nemesis/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── PK ──────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn pk_resolves_keywords() {
    let (status, body) = get_json(corpus(), "/pk?a=alba&b=bruno").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score_a"], 0);
    assert_eq!(body["score_b"], 2);
    assert_eq!(body["summary"], "Bruno Diaz wins 0:2");
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn pk_ambiguous_keyword_is_409_with_candidates() {
    let (status, body) = get_json(corpus(), "/pk?a=alba&b=diaz").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["side"], "b");
    assert!(body["error"].as_str().unwrap().starts_with("second keyword"));
    assert_eq!(body["candidates"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(corpus(), "/pk?a=diaz&b=alba").await;
    assert_eq!(body["side"], "a");
  }

  #[tokio::test]
  async fn pk_unknown_side_is_404() {
    let (status, body) = get_json(corpus(), "/pk?a=alba&b=zzz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("second"));
  }
}
