//! Query modules for the TED explorer SDK.
//!
//! [`NoticeQuery`] talks to the SPARQL endpoint; the other interfaces borrow
//! the local [`Store`](crate::store::Store) and scope every operation to an
//! owning identity.

pub mod analyses;
pub mod history;
pub mod notices;
pub mod tenders;

pub use analyses::AnalysisQuery;
pub use history::HistoryQuery;
pub use notices::{build_page_query, build_query, NoticeQuery, SearchSettings};
pub use tenders::TenderQuery;

use crate::error::{Result, TedError};

/// Reject a blank owning identity before touching the store.
pub(crate) fn require_owner(owner: &str) -> Result<&str> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(TedError::Validation("owner id is required".into()));
    }
    Ok(owner)
}
