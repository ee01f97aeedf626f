//! Keyword → person resolution.

use crate::{Error, Result, person::Person, pk::Side, store::CorpusStore};

/// Resolve `keyword` (an id or part of a name) to exactly one person.
///
/// A single match wins. Among several matches, a unique case-insensitive
/// exact name match wins. Anything else is [`Error::NotFound`] or
/// [`Error::Ambiguous`]; listing the candidates is up to the caller.
pub async fn resolve_person<S: CorpusStore>(store: &S, keyword: &str) -> Result<Person> {
  let keyword = keyword.trim();
  let mut found = store.find_persons(keyword).await.map_err(Error::store)?;

  match found.len() {
    0 => Err(Error::NotFound(keyword.to_owned())),
    1 => Ok(found.remove(0)),
    _ => {
      let mut exact = found.iter().filter(|p| p.name.eq_ignore_ascii_case(keyword));
      if let (Some(person), None) = (exact.next(), exact.next()) {
        return Ok(person.clone());
      }
      Err(Error::Ambiguous { side: None, keyword: keyword.to_owned(), candidates: found })
    }
  }
}

/// [`resolve_person`] for one side of a comparison: failures name the side,
/// as [`Error::PersonNotFound`] or a side-tagged [`Error::Ambiguous`].
pub async fn resolve_side<S: CorpusStore>(
  store: &S,
  side: Side,
  keyword: &str,
) -> Result<Person> {
  resolve_person(store, keyword).await.map_err(|err| match err {
    Error::NotFound(keyword) => Error::PersonNotFound(side, keyword),
    Error::Ambiguous { keyword, candidates, .. } => {
      Error::Ambiguous { side: Some(side), keyword, candidates }
    }
    other => other,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  fn store() -> MemoryStore {
    let person = |id: &str, name: &str| Person {
      id:         id.to_owned(),
      name:       name.to_owned(),
      country_id: None,
    };
    MemoryStore::builder()
      .person(person("2010WANG01", "Wang Yi"))
      .person(person("2012WANG02", "Wang Yifan"))
      .person(person("2013WANG03", "Wang Yiran"))
      .person(person("2014LIUU01", "Liu Bei"))
      .person(person("2015LIUU02", "Liu Bei"))
      .build()
  }

  #[tokio::test]
  async fn unique_substring_resolves() {
    let p = resolve_person(&store(), "yifan").await.unwrap();
    assert_eq!(p.id, "2012WANG02");
  }

  #[tokio::test]
  async fn id_resolves() {
    let p = resolve_person(&store(), " 2013wang03 ").await.unwrap();
    assert_eq!(p.name, "Wang Yiran");
  }

  #[tokio::test]
  async fn exact_name_breaks_ties() {
    let p = resolve_person(&store(), "wang yi").await.unwrap();
    assert_eq!(p.id, "2010WANG01");
  }

  #[tokio::test]
  async fn duplicate_names_are_ambiguous() {
    let err = resolve_person(&store(), "Liu Bei").await.unwrap_err();
    match err {
      Error::Ambiguous { side, candidates, .. } => {
        assert_eq!(side, None);
        assert_eq!(candidates.len(), 2);
      }
      other => panic!("expected ambiguity, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn side_is_named_in_failures() {
    let err = resolve_side(&store(), Side::B, "Liu Bei").await.unwrap_err();
    assert_eq!(err.to_string(), "second keyword \"Liu Bei\" matches 2 persons");
    assert!(matches!(err, Error::Ambiguous { side: Some(Side::B), .. }));

    let err = resolve_side(&store(), Side::A, "Zhang").await.unwrap_err();
    assert!(matches!(err, Error::PersonNotFound(Side::A, k) if k == "Zhang"));

    let p = resolve_side(&store(), Side::A, "yifan").await.unwrap();
    assert_eq!(p.id, "2012WANG02");
  }

  #[tokio::test]
  async fn no_match_is_not_found() {
    let err = resolve_person(&store(), "Zhang").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(k) if k == "Zhang"));
  }
}
