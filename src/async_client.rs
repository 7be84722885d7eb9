//! Async wrapper around [`TedExplorer`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the SPARQL endpoint or DuckDB is working.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ted_explorer_sdk::{AsyncTedExplorer, SearchFilters, SearchSession};
//!
//! #[tokio::main]
//! async fn main() {
//!     let explorer = AsyncTedExplorer::builder().build().await.unwrap();
//!     let session = Arc::new(SearchSession::new());
//!
//!     // Only the newest search on a session yields a page
//!     let filters = SearchFilters::new().keywords("bridge");
//!     if let Some(page) = explorer.search_latest(session, filters).await.unwrap() {
//!         println!("{} matches", page.total);
//!     }
//! }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TedError};
use crate::models::{MarketShareCalculation, SearchFilters, SearchResponse};
use crate::session::SearchSession;
use crate::TedExplorer;

// ---------------------------------------------------------------------------
// AsyncTedExplorerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncTedExplorer`] instance.
#[derive(Default)]
pub struct AsyncTedExplorerBuilder {
    endpoint_url: Option<String>,
    database_path: Option<PathBuf>,
    in_memory: bool,
    timeout: Option<Duration>,
    default_page_size: Option<usize>,
    fallback_on_error: bool,
    from_env: bool,
}

impl AsyncTedExplorerBuilder {
    pub fn endpoint_url(mut self, url: &str) -> Self {
        self.endpoint_url = Some(url.to_string());
        self
    }

    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = Some(size);
        self
    }

    pub fn fallback_on_error(mut self, enabled: bool) -> Self {
        self.fallback_on_error = enabled;
        self
    }

    /// Apply `TED_*` environment overrides before the explicit settings.
    pub fn from_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    /// Build the async explorer.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncTedExplorer> {
        tokio::task::spawn_blocking(move || {
            let mut builder = TedExplorer::builder();
            if self.from_env {
                builder = builder.from_env();
            }
            if let Some(url) = self.endpoint_url {
                builder = builder.endpoint_url(&url);
            }
            if let Some(path) = self.database_path {
                builder = builder.database_path(path);
            }
            if self.in_memory {
                builder = builder.in_memory();
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(size) = self.default_page_size {
                builder = builder.default_page_size(size);
            }
            if self.fallback_on_error {
                builder = builder.fallback_on_error(true);
            }
            Ok(AsyncTedExplorer::from_sync(builder.build()?))
        })
        .await
        .map_err(join_error)?
    }
}

// ---------------------------------------------------------------------------
// AsyncTedExplorer
// ---------------------------------------------------------------------------

/// Async wrapper around [`TedExplorer`].
///
/// The underlying explorer is shared behind a [`Mutex`] since its DuckDB
/// connection is not `Sync`. Cloning is cheap and shares the same explorer.
#[derive(Clone)]
pub struct AsyncTedExplorer {
    inner: Arc<Mutex<TedExplorer>>,
}

impl AsyncTedExplorer {
    /// Create a new builder for configuring the async explorer.
    pub fn builder() -> AsyncTedExplorerBuilder {
        AsyncTedExplorerBuilder::default()
    }

    /// Wrap an already-built explorer, e.g. one with a custom endpoint.
    pub fn from_sync(explorer: TedExplorer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(explorer)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    ///
    /// ```no_run
    /// # use ted_explorer_sdk::AsyncTedExplorer;
    /// # async fn example() -> ted_explorer_sdk::Result<()> {
    /// # let explorer = AsyncTedExplorer::builder().build().await?;
    /// let saved = explorer.run(|e| e.tenders().list("user-1")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TedExplorer) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let explorer = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = explorer
                .lock()
                .map_err(|_| TedError::Runtime("explorer lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(join_error)?
    }

    /// Search one page of notices.
    pub async fn search(&self, filters: SearchFilters) -> Result<SearchResponse> {
        self.run(move |e| e.notices().search(&filters)).await
    }

    /// Search on behalf of `session`, yielding `None` when a newer search
    /// was started on the same session while this one was in flight.
    ///
    /// The ticket is taken when this method is called, not when the future
    /// is first polled, so call order decides which search is newest.
    pub fn search_latest(
        &self,
        session: Arc<SearchSession>,
        filters: SearchFilters,
    ) -> impl Future<Output = Result<Option<SearchResponse>>> + Send + 'static {
        let ticket = session.begin();
        let explorer = self.clone();
        async move {
            let outcome = explorer.search(filters).await;
            if !session.is_current(ticket) {
                debug!(ticket = ticket.id(), "Dropping stale search response");
                return Ok(None);
            }
            outcome.map(Some)
        }
    }

    /// Compute the owner's market share.
    pub async fn market_share(&self, owner: &str) -> Result<MarketShareCalculation> {
        let owner = owner.to_string();
        self.run(move |e| e.analyses().calculate(&owner)).await
    }
}

fn join_error(e: tokio::task::JoinError) -> TedError {
    TedError::Runtime(format!("Task join error: {e}"))
}
