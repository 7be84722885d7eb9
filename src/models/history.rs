use serde::{Deserialize, Serialize};

use super::notice::SearchFilters;

// ---------------------------------------------------------------------------
// SearchHistoryEntry: A previously executed search, kept per owner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: i64,
    pub user_id: String,
    pub search_filters: SearchFilters,
    pub search_name: Option<String>,
    pub results_count: Option<i64>,
    pub created_at: String,
}
