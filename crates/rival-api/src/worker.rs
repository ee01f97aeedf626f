//! Snapshot holder and worker-task isolation for searches.
//!
//! Handlers take an `Arc` of the current store and release the lock before
//! doing any work, so [`Corpus::replace`] never disturbs a running query.
//! Consistency against writes to the store itself comes from
//! [`CorpusStore::snapshot`], which the engines take per query.
//! Searches run on their own tokio task under a deadline.

use std::{future::Future, sync::Arc, time::Duration};

use rival_core::{nemesis::MatchPolicy, store::CorpusStore};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::ApiError;

/// Default search deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options applied to every search served from a [`Corpus`].
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
  pub policy:  MatchPolicy,
  pub timeout: Duration,
}

impl Default for SearchOptions {
  fn default() -> Self {
    Self { policy: MatchPolicy::default(), timeout: DEFAULT_TIMEOUT }
  }
}

/// The store currently being served, swappable at runtime.
pub struct Corpus<S> {
  current: RwLock<Arc<S>>,
  options: SearchOptions,
}

impl<S: CorpusStore> Corpus<S> {
  pub fn new(store: S, options: SearchOptions) -> Self {
    Self { current: RwLock::new(Arc::new(store)), options }
  }

  /// The store as of now. Later replacements do not affect the returned
  /// handle.
  pub async fn current(&self) -> Arc<S> { Arc::clone(&*self.current.read().await) }

  /// Serve `store` from now on; returns the previous store.
  pub async fn replace(&self, store: S) -> Arc<S> {
    let mut current = self.current.write().await;
    std::mem::replace(&mut *current, Arc::new(store))
  }

  pub fn options(&self) -> SearchOptions { self.options }
}

/// Run `search` on its own task, giving up after `timeout`.
///
/// A timed-out task is aborted; searches are read-only so nothing is left
/// half done.
pub async fn run_search<F, T>(timeout: Duration, search: F) -> Result<T, ApiError>
where
  F: Future<Output = rival_core::Result<T>> + Send + 'static,
  T: Send + 'static,
{
  let mut task = tokio::spawn(search);
  match tokio::time::timeout(timeout, &mut task).await {
    Ok(Ok(result)) => Ok(result?),
    Ok(Err(join)) => Err(ApiError::Worker(join.to_string())),
    Err(_) => {
      task.abort();
      warn!(?timeout, "search abandoned");
      Err(ApiError::Timeout(timeout))
    }
  }
}
