//! Load a results export (one tab-separated file per table) into a
//! [`SqliteStore`].
//!
//! Files are found anywhere under the export directory as `{table}.tsv` or
//! `WCA_export_{table}.tsv`, matched case-insensitively; the legacy
//! CamelCase table names (`RanksSingle`, ...) and column names
//! (`personId`, ...) are accepted too. Every required table must be present
//! before anything is written.

use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use tracing::{info, warn};

use rival_core::{
  event::{Event, FormatTag},
  person::{Country, Person},
  record::{RankRecord, rank_from_raw},
};

use crate::{Dataset, Error, Result, SqliteStore, TableCounts};

/// `(table, legacy name)` for every table the importer loads.
const TABLES: [(&str, &str); 5] = [
  ("countries", "Countries"),
  ("events", "Events"),
  ("persons", "Persons"),
  ("ranks_single", "RanksSingle"),
  ("ranks_average", "RanksAverage"),
];

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CountryRow {
  id:           String,
  #[serde(alias = "continentId")]
  continent_id: String,
  #[serde(default)]
  iso2:         Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
  id:     String,
  name:   String,
  #[serde(default)]
  format: String,
  rank:   i64,
}

#[derive(Debug, Deserialize)]
struct PersonRow {
  #[serde(alias = "id")]
  wca_id:     String,
  #[serde(alias = "subid", alias = "subId")]
  sub_id:     u32,
  name:       String,
  #[serde(alias = "countryId")]
  country_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RankRow {
  #[serde(alias = "personId")]
  person_id:      String,
  #[serde(alias = "eventId")]
  event_id:       String,
  best:           i64,
  #[serde(alias = "worldRank", default)]
  world_rank:     Option<i64>,
  #[serde(alias = "continentRank", default)]
  continent_rank: Option<i64>,
  #[serde(alias = "countryRank", default)]
  country_rank:   Option<i64>,
}

impl From<CountryRow> for Country {
  fn from(row: CountryRow) -> Self {
    Self { id: row.id, continent_id: row.continent_id, iso2: row.iso2 }
  }
}

impl From<EventRow> for Event {
  fn from(row: EventRow) -> Self {
    Self {
      id:     row.id,
      name:   row.name,
      format: FormatTag::from_export(&row.format),
      rank:   row.rank,
    }
  }
}

impl From<RankRow> for RankRecord {
  fn from(row: RankRow) -> Self {
    let rank = |raw: Option<i64>| raw.and_then(rank_from_raw);
    Self {
      person_id:      row.person_id,
      event_id:       row.event_id,
      best:           row.best,
      world_rank:     rank(row.world_rank),
      continent_rank: rank(row.continent_rank),
      country_rank:   rank(row.country_rank),
    }
  }
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// Parse every table of the export under `dir`.
fn read_export(dir: &Path) -> Result<Dataset> {
  let locate = |(table, legacy): (&'static str, &str)| -> Result<PathBuf> {
    find_table_file(dir, table, legacy)?
      .ok_or_else(|| Error::MissingTable { table, dir: dir.to_owned() })
  };
  let [countries, events, persons, single, average] = TABLES;
  let (countries, events, persons, single, average) = (
    locate(countries)?,
    locate(events)?,
    locate(persons)?,
    locate(single)?,
    locate(average)?,
  );

  let persons: Vec<Person> = read_rows::<PersonRow>(&persons)?
    .into_iter()
    .filter(|row| row.sub_id == 1)
    .map(|row| Person { id: row.wca_id, name: row.name, country_id: row.country_id })
    .collect();

  Ok(Dataset {
    countries: convert(read_rows::<CountryRow>(&countries)?),
    events: convert(read_rows::<EventRow>(&events)?),
    persons,
    ranks_single: convert(read_rows::<RankRow>(&single)?),
    ranks_average: convert(read_rows::<RankRow>(&average)?),
  })
}

fn convert<R, T: From<R>>(rows: Vec<R>) -> Vec<T> { rows.into_iter().map(T::from).collect() }

/// Depth-first search for the table's file, visiting entries in name order.
fn find_table_file(dir: &Path, table: &str, legacy: &str) -> Result<Option<PathBuf>> {
  let wanted = [
    format!("{table}.tsv"),
    format!("wca_export_{table}.tsv"),
    format!("{legacy}.tsv").to_lowercase(),
    format!("wca_export_{legacy}.tsv").to_lowercase(),
  ];

  let mut entries = fs::read_dir(dir)?
    .map(|entry| entry.map(|e| e.path()))
    .collect::<std::io::Result<Vec<_>>>()?;
  entries.sort();

  for path in &entries {
    let matches = path
      .file_name()
      .and_then(|name| name.to_str())
      .is_some_and(|name| wanted.contains(&name.to_lowercase()));
    if path.is_file() && matches {
      return Ok(Some(path.clone()));
    }
  }
  for path in entries.iter().filter(|p| p.is_dir()) {
    if let Some(found) = find_table_file(path, table, legacy)? {
      return Ok(Some(found));
    }
  }
  Ok(None)
}

/// Read every well-formed row of a TSV file. Malformed rows are skipped with
/// a warning; I/O failures abort.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
  let tsv = |source| Error::Tsv { path: path.to_owned(), source };

  info!(path = %path.display(), "reading export table");
  let mut reader = csv::ReaderBuilder::new()
    .delimiter(b'\t')
    .quoting(false)
    .from_path(path)
    .map_err(tsv)?;

  let mut rows = Vec::new();
  let mut skipped = 0usize;
  for row in reader.deserialize() {
    match row {
      Ok(row) => rows.push(row),
      Err(err) if err.is_io_error() => return Err(tsv(err)),
      Err(err) => {
        skipped += 1;
        let line = err.position().map(|p| p.line());
        warn!(path = %path.display(), ?line, error = %err, "skipping malformed row");
      }
    }
  }
  if skipped > 0 {
    warn!(path = %path.display(), skipped, "malformed rows skipped");
  }
  Ok(rows)
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Replace the store's contents with the export under `dir`.
///
/// All tables are written in one transaction, so a failed import leaves the
/// previous corpus in place. Returns the row counts after import.
pub async fn import_export_dir(store: &SqliteStore, dir: impl AsRef<Path>) -> Result<TableCounts> {
  let dir = dir.as_ref().to_owned();
  info!(dir = %dir.display(), "importing export");
  let data = tokio::task::spawn_blocking(move || read_export(&dir)).await??;
  store.replace_all(data).await?;

  let counts = store.verify().await?;
  info!(?counts, "import complete");
  Ok(counts)
}
