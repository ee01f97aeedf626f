//! [`SqliteStore`], the SQLite implementation of [`CorpusStore`].

use std::{
  collections::{HashMap, HashSet},
  path::{Path, PathBuf},
  sync::Arc,
};

use rusqlite::{OptionalExtension as _, Statement};
use serde::Serialize;
use tracing::info;

use rival_core::{
  event::Event,
  person::{Country, Person},
  record::{BestRecords, RankKind, RankRecord},
  store::{CorpusStore, FIND_LIMIT},
};

use crate::{
  Error, Result,
  encode::{
    COUNTRY_COLUMNS, EVENT_COLUMNS, EVENT_ORDER, PERSON_COLUMNS, RANK_COLUMNS,
    country_from_row, encode_rank, event_from_row, person_from_row, placeholders,
    rank_from_row, ranks_table,
  },
  schema::{REQUIRED_TABLES, SCHEMA},
};

/// Ids bound per `IN (...)` query.
const ID_CHUNK: usize = 500;

/// Keyword lookup by id; served by `persons_id_nocase_idx`.
pub(crate) const EXACT_ID: &str = "WHERE id = ?1 COLLATE NOCASE LIMIT 1";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A results corpus backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. A plain
/// handle sees every committed write. [`CorpusStore::snapshot`] opens a
/// second connection to the file and holds a read transaction on it for as
/// long as any clone of the snapshot lives, so WAL keeps its view fixed.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  /// Backing file; `None` for in-memory stores.
  path:   Option<Arc<PathBuf>>,
  /// Whether `conn` holds an open read transaction.
  pinned: bool,
}

/// Row counts of the required tables, as reported by [`SqliteStore::verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
  pub countries:     u64,
  pub events:        u64,
  pub persons:       u64,
  pub ranks_single:  u64,
  pub ranks_average: u64,
}

/// The full contents of a corpus, written at once by
/// [`SqliteStore::replace_all`].
#[derive(Debug, Default)]
pub struct Dataset {
  pub countries:     Vec<Country>,
  pub events:        Vec<Event>,
  pub persons:       Vec<Person>,
  pub ranks_single:  Vec<RankRecord>,
  pub ranks_average: Vec<RankRecord>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn, path: Some(Arc::new(path)), pinned: false };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  ///
  /// There is no second connection to pin, so its snapshots share this
  /// handle's connection and see writes made through it.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, path: None, pinned: false };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Check that every required table exists and count its rows.
  pub async fn verify(&self) -> Result<TableCounts> {
    let checked = self
      .conn
      .call(|conn| {
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
          let exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |r| r.get(0),
          )?;
          if !exists {
            missing.push(table.to_owned());
          }
        }
        if !missing.is_empty() {
          return Ok(Err(missing));
        }

        let count = |table: &str| -> rusqlite::Result<u64> {
          let n: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
          Ok(u64::try_from(n).unwrap_or_default())
        };
        Ok(Ok(TableCounts {
          countries:     count("countries")?,
          events:        count("events")?,
          persons:       count("persons")?,
          ranks_single:  count("ranks_single")?,
          ranks_average: count("ranks_average")?,
        }))
      })
      .await?;

    checked.map_err(Error::Incomplete)
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Run `write` inside one transaction; nothing is kept if it fails.
  async fn write<R, F>(&self, write: F) -> Result<R>
  where
    R: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
  {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let written = write(&*tx)?;
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  /// Replace every table with `data` in a single transaction.
  ///
  /// Readers see either the old corpus or the new one, never a mix.
  pub async fn replace_all(&self, data: Dataset) -> Result<()> {
    let written = self
      .write(move |conn| {
        Ok([
          ("countries", write_countries(conn, &data.countries)?),
          ("events", write_events(conn, &data.events)?),
          ("persons", write_persons(conn, &data.persons)?),
          ("ranks_single", write_ranks(conn, RankKind::Single, &data.ranks_single)?),
          ("ranks_average", write_ranks(conn, RankKind::Average, &data.ranks_average)?),
        ])
      })
      .await?;

    for (table, rows) in written {
      info!(table, rows, "table replaced");
    }
    Ok(())
  }

  pub async fn replace_countries(&self, countries: Vec<Country>) -> Result<usize> {
    let rows = self.write(move |conn| write_countries(conn, &countries)).await?;
    info!(table = "countries", rows, "table replaced");
    Ok(rows)
  }

  pub async fn replace_events(&self, events: Vec<Event>) -> Result<usize> {
    let rows = self.write(move |conn| write_events(conn, &events)).await?;
    info!(table = "events", rows, "table replaced");
    Ok(rows)
  }

  pub async fn replace_persons(&self, persons: Vec<Person>) -> Result<usize> {
    let rows = self.write(move |conn| write_persons(conn, &persons)).await?;
    info!(table = "persons", rows, "table replaced");
    Ok(rows)
  }

  pub async fn replace_ranks(&self, kind: RankKind, records: Vec<RankRecord>) -> Result<usize> {
    let rows = self.write(move |conn| write_ranks(conn, kind, &records)).await?;
    info!(table = ranks_table(kind), rows, "table replaced");
    Ok(rows)
  }
}

// ─── Table writers ───────────────────────────────────────────────────────────

/// Empty `table`, then insert every row through the `insert` statement.
fn rewrite<T>(
  conn: &rusqlite::Connection,
  table: &str,
  insert: &str,
  rows: &[T],
  bind: impl Fn(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
) -> rusqlite::Result<usize> {
  conn.execute(&format!("DELETE FROM {table}"), [])?;
  let mut stmt = conn.prepare(insert)?;
  for row in rows {
    bind(&mut stmt, row)?;
  }
  Ok(rows.len())
}

fn write_countries(conn: &rusqlite::Connection, rows: &[Country]) -> rusqlite::Result<usize> {
  rewrite(
    conn,
    "countries",
    &format!("INSERT OR REPLACE INTO countries ({COUNTRY_COLUMNS}) VALUES (?1, ?2, ?3)"),
    rows,
    |stmt, c| stmt.execute(rusqlite::params![c.id, c.continent_id, c.iso2]),
  )
}

fn write_events(conn: &rusqlite::Connection, rows: &[Event]) -> rusqlite::Result<usize> {
  rewrite(
    conn,
    "events",
    &format!("INSERT OR REPLACE INTO events ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
    rows,
    |stmt, e| stmt.execute(rusqlite::params![e.id, e.name, e.format.as_export(), e.rank]),
  )
}

fn write_persons(conn: &rusqlite::Connection, rows: &[Person]) -> rusqlite::Result<usize> {
  rewrite(
    conn,
    "persons",
    &format!("INSERT OR REPLACE INTO persons ({PERSON_COLUMNS}) VALUES (?1, ?2, ?3)"),
    rows,
    |stmt, p| stmt.execute(rusqlite::params![p.id, p.name, p.country_id]),
  )
}

fn write_ranks(
  conn: &rusqlite::Connection,
  kind: RankKind,
  rows: &[RankRecord],
) -> rusqlite::Result<usize> {
  let table = ranks_table(kind);
  rewrite(
    conn,
    table,
    &format!("INSERT OR REPLACE INTO {table} ({RANK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
    rows,
    |stmt, r| {
      stmt.execute(rusqlite::params![
        r.person_id,
        r.event_id,
        r.best,
        encode_rank(r.world_rank),
        encode_rank(r.continent_rank),
        encode_rank(r.country_rank),
      ])
    },
  )
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Run `SELECT {select} WHERE id IN (...)` over `ids` in chunks.
fn select_by_ids<T>(
  conn: &rusqlite::Connection,
  select: &str,
  ids: &[String],
  map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut out = Vec::with_capacity(ids.len());
  for chunk in ids.chunks(ID_CHUNK) {
    let sql = format!("{select} WHERE id IN ({})", placeholders(chunk.len()));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(chunk), map)?;
    for row in rows {
      out.push(row?);
    }
  }
  Ok(out)
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(keyword: &str) -> String {
  let mut out = String::with_capacity(keyword.len());
  for c in keyword.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

// ─── CorpusStore impl ────────────────────────────────────────────────────────

impl CorpusStore for SqliteStore {
  type Error = Error;

  async fn snapshot(&self) -> Result<Self> {
    let Some(path) = self.path.as_ref().filter(|_| !self.pinned) else {
      return Ok(self.clone());
    };
    let conn = tokio_rusqlite::Connection::open(path.as_path()).await?;
    conn
      .call(|conn| {
        conn.execute_batch("BEGIN DEFERRED")?;
        // The read snapshot starts with the first read, not with BEGIN.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, path: Some(Arc::clone(path)), pinned: true })
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn get_person(&self, id: &str) -> Result<Option<Person>> {
    let id = id.to_owned();
    let person = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1"),
              [id],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(person)
  }

  async fn get_persons(&self, ids: &[String]) -> Result<Vec<Person>> {
    let ids = ids.to_vec();
    let persons = self
      .conn
      .call(move |conn| {
        let select = format!("SELECT {PERSON_COLUMNS} FROM persons");
        Ok(select_by_ids(conn, &select, &ids, person_from_row)?)
      })
      .await?;
    Ok(persons)
  }

  async fn find_persons(&self, keyword: &str) -> Result<Vec<Person>> {
    let keyword = keyword.trim().to_owned();
    if keyword.is_empty() {
      return Ok(Vec::new());
    }

    let persons = self
      .conn
      .call(move |conn| {
        let exact = conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM persons {EXACT_ID}"),
            [&keyword],
            person_from_row,
          )
          .optional()?;
        if let Some(person) = exact {
          return Ok(vec![person]);
        }

        let pattern = format!("%{}%", escape_like(&keyword));
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM persons
           WHERE name LIKE ?1 ESCAPE '\\'
           ORDER BY name, id
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, FIND_LIMIT as i64], person_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(persons)
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn get_best_records(&self, person_id: &str) -> Result<BestRecords> {
    let person_id = person_id.to_owned();
    let records = self
      .conn
      .call(move |conn| {
        let mut records = BestRecords::default();
        for kind in RankKind::ALL {
          let mut stmt = conn.prepare(&format!(
            "SELECT {RANK_COLUMNS} FROM {} WHERE person_id = ?1",
            ranks_table(kind)
          ))?;
          let rows = stmt.query_map([&person_id], rank_from_row)?;
          for row in rows {
            records.insert(kind, row?);
          }
        }
        Ok(records)
      })
      .await?;
    Ok(records)
  }

  async fn persons_below(
    &self,
    event_id: &str,
    kind: RankKind,
    threshold: i64,
  ) -> Result<HashSet<String>> {
    let event_id = event_id.to_owned();
    let ids = self
      .conn
      .call(move |conn| {
        // Served by the (event_id, best, person_id) covering index.
        let mut stmt = conn.prepare_cached(&format!(
          "SELECT person_id FROM {}
           WHERE event_id = ?1 AND best > 0 AND best < ?2",
          ranks_table(kind)
        ))?;
        let ids = stmt
          .query_map(rusqlite::params![event_id, threshold], |r| r.get(0))?
          .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn list_events(&self) -> Result<Vec<Event>> {
    let events = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events {EVENT_ORDER}"))?;
        let rows = stmt
          .query_map([], event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(events)
  }

  async fn get_country(&self, id: &str) -> Result<Option<Country>> {
    let id = id.to_owned();
    let country = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = ?1"),
              [id],
              country_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(country)
  }

  async fn get_countries(&self, ids: &[String]) -> Result<HashMap<String, Country>> {
    let ids = ids.to_vec();
    let countries = self
      .conn
      .call(move |conn| {
        let select = format!("SELECT {COUNTRY_COLUMNS} FROM countries");
        Ok(select_by_ids(conn, &select, &ids, country_from_row)?)
      })
      .await?;
    Ok(countries.into_iter().map(|c| (c.id.clone(), c)).collect())
  }
}
