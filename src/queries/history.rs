//! Per-owner search history.

use serde::Deserialize;

use crate::error::{Result, TedError};
use crate::models::{SearchFilters, SearchHistoryEntry};
use crate::queries::require_owner;
use crate::store::{now_timestamp, Store};

#[derive(Debug, Deserialize)]
struct HistoryRow {
    id: i64,
    user_id: String,
    search_filters: String,
    search_name: Option<String>,
    results_count: Option<i64>,
    created_at: String,
}

impl TryFrom<HistoryRow> for SearchHistoryEntry {
    type Error = TedError;

    fn try_from(row: HistoryRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            search_filters: serde_json::from_str(&row.search_filters)?,
            search_name: row.search_name,
            results_count: row.results_count,
            created_at: row.created_at,
        })
    }
}

/// Query interface for the `search_history` table.
pub struct HistoryQuery<'a> {
    store: &'a Store,
}

impl<'a> HistoryQuery<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Record an executed search.
    pub fn record(
        &self,
        owner: &str,
        filters: &SearchFilters,
        name: Option<&str>,
        results_count: Option<usize>,
    ) -> Result<SearchHistoryEntry> {
        let owner = require_owner(owner)?;
        let filters_json = serde_json::to_string(filters)?;
        let count = results_count.map(|c| c as i64);
        let rows = self.store.execute_into::<HistoryRow>(
            "INSERT INTO search_history (user_id, search_filters, search_name, results_count, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
            duckdb::params![owner, filters_json, name, count, now_timestamp()],
        )?;
        rows.into_iter()
            .next()
            .ok_or_else(|| TedError::NotFound("search history entry was not returned".into()))?
            .try_into()
    }

    /// The owner's searches, newest first, optionally capped at `limit`.
    pub fn list(&self, owner: &str, limit: Option<usize>) -> Result<Vec<SearchHistoryEntry>> {
        let owner = require_owner(owner)?;
        let mut sql = "SELECT * FROM search_history WHERE user_id = ? \
                       ORDER BY created_at DESC, id DESC"
            .to_string();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        let rows = self
            .store
            .execute_into::<HistoryRow>(&sql, duckdb::params![owner])?;
        rows.into_iter().map(SearchHistoryEntry::try_from).collect()
    }

    /// Remove all of the owner's history. Returns the number of entries removed.
    pub fn clear(&self, owner: &str) -> Result<usize> {
        let owner = require_owner(owner)?;
        self.store.execute_update(
            "DELETE FROM search_history WHERE user_id = ?",
            duckdb::params![owner],
        )
    }
}
