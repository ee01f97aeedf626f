//! Error type for `rival-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("tsv error in {path}: {source}")]
  Tsv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("import task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  /// The export directory has no file for a required table.
  #[error("no export file for table {table:?} under {dir}")]
  MissingTable { table: &'static str, dir: PathBuf },

  /// The database lacks tables the store needs.
  #[error("store is missing tables: {}", .0.join(", "))]
  Incomplete(Vec<String>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
