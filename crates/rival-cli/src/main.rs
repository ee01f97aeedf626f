//! `rival`: query a competition results corpus.
//!
//! # Usage
//!
//! ```text
//! rival import ./WCA_export
//! rival person "Max Park"
//! rival nemesis 2012PARK03 --limit 10
//! rival pk 2012PARK03 "Yiheng Wang"
//! rival serve
//! ```
//!
//! Settings come from `rival.toml` (or `--config`) and `RIVAL_*` variables.

mod render;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use rival_api::Corpus;
use rival_core::{
  Error as CoreError,
  nemesis::NemesisSearch,
  person::Person,
  pk::{Comparator, Side},
  profile,
  resolve::{resolve_person, resolve_side},
  store::CorpusStore as _,
};
use rival_store_sqlite::{SqliteStore, import::import_export_dir};
use settings::Settings;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rival", version, about = "Query a competition results corpus")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "rival.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Replace the store's contents with a TSV export directory.
  Import {
    dir: PathBuf,
  },
  /// Show a person's records.
  Person {
    keyword: String,
  },
  /// List everyone better than a person in all of their events.
  Nemesis {
    keyword: String,
    /// List the members of scopes with at most this many persons.
    #[arg(long, default_value_t = render::DEFAULT_LIST_LIMIT)]
    limit:   usize,
  },
  /// Compare two persons event by event.
  Pk {
    a: String,
    b: String,
  },
  /// Serve the JSON API.
  Serve,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  match cli.command {
    Command::Import { dir } => {
      let counts = import_export_dir(&store, &dir)
        .await
        .with_context(|| format!("failed to import {}", dir.display()))?;
      println!(
        "imported {} persons, {} events, {} countries, {} single and {} average records",
        counts.persons,
        counts.events,
        counts.countries,
        counts.ranks_single,
        counts.ranks_average
      );
    }
    Command::Person { keyword } => {
      let person = resolve(&store, &keyword, None).await?;
      let profile = profile::profile(&store, &person.id).await?;
      println!("{}", render::profile(&profile));
    }
    Command::Nemesis { keyword, limit } => {
      let person = resolve(&store, &keyword, None).await?;
      let report = NemesisSearch::new(Arc::new(store))
        .with_policy(settings.match_policy)
        .query(&person.id)
        .await?;
      println!("{}", render::nemesis(&report, limit));
    }
    Command::Pk { a, b } => {
      let store = store.snapshot().await?;
      let a = resolve(&store, &a, Some(Side::A)).await?;
      let b = resolve(&store, &b, Some(Side::B)).await?;
      let h2h = Comparator::new(Arc::new(store)).compare(&a.id, &b.id).await?;
      println!("{}", render::head_to_head(&h2h));
    }
    Command::Serve => serve(store, &settings).await?,
  }

  Ok(())
}

/// Resolve a keyword, printing the candidates when it is ambiguous.
async fn resolve(store: &SqliteStore, keyword: &str, side: Option<Side>) -> Result<Person> {
  let resolved = match side {
    Some(side) => resolve_side(store, side, keyword).await,
    None => resolve_person(store, keyword).await,
  };
  match resolved {
    Err(CoreError::Ambiguous { side, keyword, candidates }) => {
      println!("{}", render::candidates(&keyword, &candidates));
      match side {
        Some(side) => bail!("{side} keyword {keyword:?} is ambiguous"),
        None => bail!("{keyword:?} is ambiguous"),
      }
    }
    resolved => Ok(resolved?),
  }
}

async fn serve(store: SqliteStore, settings: &Settings) -> Result<()> {
  let counts = store.verify().await.context("store failed verification")?;
  if counts.persons == 0 {
    warn!("store is empty; run `rival import` first");
  }

  let corpus = Arc::new(Corpus::new(store, settings.search_options()));
  let app = axum::Router::new().nest("/api", rival_api::api_router(corpus));
  let address = settings.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
