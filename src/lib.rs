//! TED explorer SDK for Rust.
//!
//! Searches the EU Tenders Electronic Daily (TED) procurement notices through
//! their public SPARQL endpoint, pages through and exports the results, and
//! keeps a per-owner collection of saved tenders in a local DuckDB database
//! for market share analysis.
//!
//! # Quick start
//!
//! ```no_run
//! use ted_explorer_sdk::{SearchFilters, TedExplorer};
//!
//! let explorer = TedExplorer::builder().build().unwrap();
//!
//! // Second page of German hospital notices
//! let filters = SearchFilters::new().keywords("hospital").country("DE").page(2);
//! let page = explorer.notices().search(&filters).unwrap();
//!
//! // Save a hit and compute the market share
//! let hit = ted_explorer_sdk::NewSavedTender::from_result(&page.results[0]).value(1000.0, "EUR");
//! explorer.tenders().save("user-1", &hit).unwrap();
//! let share = explorer.analyses().calculate("user-1").unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod market_share;
pub mod mock_data;
pub mod models;
pub mod queries;
pub mod session;
pub mod sparql_builder;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncTedExplorer;
pub use endpoint::{HttpEndpoint, QueryEndpoint};
pub use error::{QueryPhase, Result, TedError};
pub use market_share::compute_market_share;
pub use models::*;
pub use queries::SearchSettings;
pub use session::{SearchSession, SearchTicket};
pub use sparql_builder::SparqlBuilder;
pub use store::Store;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TedExplorerBuilder
// ---------------------------------------------------------------------------

enum DatabaseLocation {
    Default,
    Path(PathBuf),
    InMemory,
}

/// Builder for configuring and constructing a [`TedExplorer`] instance.
///
/// Use [`TedExplorer::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TedExplorerBuilder::build).
pub struct TedExplorerBuilder {
    endpoint_url: String,
    endpoint: Option<Box<dyn QueryEndpoint>>,
    default_page_size: usize,
    timeout: Duration,
    fallback_on_error: bool,
    database: DatabaseLocation,
}

impl Default for TedExplorerBuilder {
    fn default() -> Self {
        Self {
            endpoint_url: config::SPARQL_ENDPOINT.to_string(),
            endpoint: None,
            default_page_size: config::DEFAULT_PAGE_SIZE,
            timeout: config::DEFAULT_TIMEOUT,
            fallback_on_error: false,
            database: DatabaseLocation::Default,
        }
    }
}

impl TedExplorerBuilder {
    /// Apply overrides from the `TED_*` environment variables.
    ///
    /// Unset or unparsable variables leave the current setting in place.
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = std::env::var(config::ENV_ENDPOINT) {
            if !url.trim().is_empty() {
                self.endpoint_url = url.trim().to_string();
            }
        }
        if let Some(size) = std::env::var(config::ENV_PAGE_SIZE)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            self.default_page_size = size;
        }
        if let Ok(flag) = std::env::var(config::ENV_FALLBACK) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.fallback_on_error = true,
                "0" | "false" | "no" | "off" => self.fallback_on_error = false,
                _ => {}
            }
        }
        if let Ok(path) = std::env::var(config::ENV_DATABASE_PATH) {
            if !path.trim().is_empty() {
                self.database = DatabaseLocation::Path(PathBuf::from(path.trim()));
            }
        }
        self
    }

    /// Set the SPARQL endpoint URL. Defaults to the EU Publications Office.
    pub fn endpoint_url(mut self, url: &str) -> Self {
        self.endpoint_url = url.to_string();
        self
    }

    /// Use a custom endpoint implementation instead of HTTP.
    pub fn endpoint<E: QueryEndpoint + 'static>(mut self, endpoint: E) -> Self {
        self.endpoint = Some(Box::new(endpoint));
        self
    }

    /// Page size used when a search does not specify one. Defaults to 10.
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Per-request HTTP timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace endpoint failures with a labelled synthetic dataset.
    ///
    /// Defaults to `false`, in which case failures are returned as errors.
    pub fn fallback_on_error(mut self, enabled: bool) -> Self {
        self.fallback_on_error = enabled;
        self
    }

    /// Store saved tenders in the given database file.
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = DatabaseLocation::Path(path.as_ref().to_path_buf());
        self
    }

    /// Keep saved tenders in memory only.
    pub fn in_memory(mut self) -> Self {
        self.database = DatabaseLocation::InMemory;
        self
    }

    /// Build the explorer, opening the store and the endpoint client.
    pub fn build(self) -> Result<TedExplorer> {
        if self.default_page_size == 0 {
            return Err(TedError::Validation("default page size must be positive".into()));
        }

        let endpoint: Box<dyn QueryEndpoint> = match self.endpoint {
            Some(e) => e,
            None => Box::new(HttpEndpoint::new(&self.endpoint_url, self.timeout)?),
        };

        let store = match self.database {
            DatabaseLocation::InMemory => Store::open_in_memory()?,
            DatabaseLocation::Path(p) => Store::open(&p)?,
            DatabaseLocation::Default => {
                Store::open(&config::default_data_dir().join(config::DATABASE_FILE))?
            }
        };

        Ok(TedExplorer {
            endpoint,
            endpoint_url: self.endpoint_url,
            settings: SearchSettings {
                default_page_size: self.default_page_size,
                fallback_on_error: self.fallback_on_error,
            },
            store,
        })
    }
}

// ---------------------------------------------------------------------------
// TedExplorer
// ---------------------------------------------------------------------------

/// The main entry point for the SDK.
///
/// Owns the endpoint client and the local [`Store`], and exposes the query
/// interfaces as lightweight borrowing wrappers. Holds no search state
/// between calls.
pub struct TedExplorer {
    endpoint: Box<dyn QueryEndpoint>,
    endpoint_url: String,
    settings: SearchSettings,
    store: Store,
}

impl TedExplorer {
    /// Create a new builder for configuring the explorer.
    pub fn builder() -> TedExplorerBuilder {
        TedExplorerBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the notice search interface.
    pub fn notices(&self) -> queries::NoticeQuery<'_> {
        queries::NoticeQuery::new(&*self.endpoint, self.settings)
    }

    /// Access the saved-tender interface.
    pub fn tenders(&self) -> queries::TenderQuery<'_> {
        queries::TenderQuery::new(&self.store)
    }

    /// Access the market share analysis interface.
    pub fn analyses(&self) -> queries::AnalysisQuery<'_> {
        queries::AnalysisQuery::new(&self.store)
    }

    /// Access the search history interface.
    pub fn history(&self) -> queries::HistoryQuery<'_> {
        queries::HistoryQuery::new(&self.store)
    }

    // -- Metadata and utility methods --------------------------------------

    /// CPV divisions and countries offered as search filters.
    pub fn metadata(&self) -> Metadata {
        Metadata::builtin()
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// Return a reference to the underlying [`Store`] for advanced usage.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch every match for `filters` and write it to `path` as CSV.
    ///
    /// Returns the response the file was written from, so callers can see
    /// whether it was synthetic.
    pub fn export_all(&self, filters: &SearchFilters, path: &Path) -> Result<SearchResponse> {
        let response = self.notices().fetch_all(filters)?;
        export::export_to_path(&response.results, path)?;
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TedExplorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let db = self
            .store
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        write!(
            f,
            "TedExplorer(endpoint={}, database={}, page_size={}, fallback_on_error={})",
            self.endpoint_url, db, self.settings.default_page_size, self.settings.fallback_on_error
        )
    }
}
