//! Saved-tender persistence, one collection per owner.

use tracing::info;

use crate::error::{Result, TedError};
use crate::models::{NewSavedTender, SavedTender, ValuedTender};
use crate::queries::require_owner;
use crate::store::{is_unique_violation, now_timestamp, Store};

// ---------------------------------------------------------------------------
// TenderQuery
// ---------------------------------------------------------------------------

/// Query interface for the `saved_tenders` table.
pub struct TenderQuery<'a> {
    store: &'a Store,
}

impl<'a> TenderQuery<'a> {
    /// Create a new `TenderQuery` bound to the given store.
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Save a tender for `owner`.
    ///
    /// Fails with [`TedError::DuplicateRecord`] if the owner already saved
    /// the same `ted_id`; the existing record is left untouched.
    pub fn save(&self, owner: &str, tender: &NewSavedTender) -> Result<SavedTender> {
        let owner = require_owner(owner)?;
        require_text("ted_id", &tender.ted_id)?;
        require_text("title", &tender.title)?;
        require_text("date", &tender.date)?;
        if let Some(value) = tender.tender_value {
            check_value(value)?;
        }

        if self.get_by_ted_id(owner, &tender.ted_id)?.is_some() {
            return Err(duplicate(owner, &tender.ted_id));
        }

        let now = now_timestamp();
        let inserted = self.store.execute_into::<SavedTender>(
            "INSERT INTO saved_tenders (\
                user_id, ted_id, title, date, cpv_code, cpv_description, country, \
                country_name, notice_type, uri, tender_value, currency, is_our_sector, \
                notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
            duckdb::params![
                owner,
                tender.ted_id,
                tender.title,
                tender.date,
                tender.cpv_code,
                tender.cpv_description,
                tender.country,
                tender.country_name,
                tender.notice_type,
                tender.uri,
                tender.tender_value,
                tender.currency,
                tender.is_our_sector,
                tender.notes,
                now,
                now,
            ],
        );

        let saved = match inserted {
            Ok(rows) => rows.into_iter().next(),
            Err(e) if is_unique_violation(&e) => return Err(duplicate(owner, &tender.ted_id)),
            Err(e) => return Err(e),
        };
        let saved = saved.ok_or_else(|| {
            TedError::NotFound(format!("saved tender {} was not returned", tender.ted_id))
        })?;

        info!(owner, ted_id = %saved.ted_id, id = saved.id, "Saved tender");
        Ok(saved)
    }

    /// Get one of the owner's saved tenders by record id.
    pub fn get(&self, owner: &str, id: i64) -> Result<Option<SavedTender>> {
        let owner = require_owner(owner)?;
        let rows = self.store.execute_into::<SavedTender>(
            "SELECT * FROM saved_tenders WHERE user_id = ? AND id = ?",
            duckdb::params![owner, id],
        )?;
        Ok(rows.into_iter().next())
    }

    /// Get one of the owner's saved tenders by its TED notice id.
    pub fn get_by_ted_id(&self, owner: &str, ted_id: &str) -> Result<Option<SavedTender>> {
        let owner = require_owner(owner)?;
        let rows = self.store.execute_into::<SavedTender>(
            "SELECT * FROM saved_tenders WHERE user_id = ? AND ted_id = ?",
            duckdb::params![owner, ted_id],
        )?;
        Ok(rows.into_iter().next())
    }

    /// All of the owner's saved tenders, newest first.
    pub fn list(&self, owner: &str) -> Result<Vec<SavedTender>> {
        let owner = require_owner(owner)?;
        self.store.execute_into(
            "SELECT * FROM saved_tenders WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC",
            duckdb::params![owner],
        )
    }

    /// Number of tenders the owner has saved.
    pub fn count(&self, owner: &str) -> Result<usize> {
        let owner = require_owner(owner)?;
        let cnt = self
            .store
            .execute_scalar(
                "SELECT COUNT(*) FROM saved_tenders WHERE user_id = ?",
                duckdb::params![owner],
            )?
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        Ok(cnt as usize)
    }

    /// Flip the "our sector" flag of a single tender.
    pub fn toggle_our_sector(&self, owner: &str, id: i64) -> Result<SavedTender> {
        let owner = require_owner(owner)?;
        self.update_one(
            owner,
            id,
            "UPDATE saved_tenders SET is_our_sector = NOT is_our_sector, updated_at = ? \
             WHERE user_id = ? AND id = ? RETURNING *",
            duckdb::params![now_timestamp(), owner, id],
        )
    }

    /// Set the "our sector" flag of a single tender.
    pub fn set_our_sector(&self, owner: &str, id: i64, flag: bool) -> Result<SavedTender> {
        let owner = require_owner(owner)?;
        self.update_one(
            owner,
            id,
            "UPDATE saved_tenders SET is_our_sector = ?, updated_at = ? \
             WHERE user_id = ? AND id = ? RETURNING *",
            duckdb::params![flag, now_timestamp(), owner, id],
        )
    }

    /// Set or clear a tender's monetary value. `currency` is kept when `None`.
    pub fn update_value(
        &self,
        owner: &str,
        id: i64,
        value: Option<f64>,
        currency: Option<&str>,
    ) -> Result<SavedTender> {
        let owner = require_owner(owner)?;
        if let Some(v) = value {
            check_value(v)?;
        }
        self.update_one(
            owner,
            id,
            "UPDATE saved_tenders SET tender_value = ?, currency = COALESCE(?, currency), \
             updated_at = ? WHERE user_id = ? AND id = ? RETURNING *",
            duckdb::params![value, currency, now_timestamp(), owner, id],
        )
    }

    pub fn update_notes(&self, owner: &str, id: i64, notes: Option<&str>) -> Result<SavedTender> {
        let owner = require_owner(owner)?;
        self.update_one(
            owner,
            id,
            "UPDATE saved_tenders SET notes = ?, updated_at = ? \
             WHERE user_id = ? AND id = ? RETURNING *",
            duckdb::params![notes, now_timestamp(), owner, id],
        )
    }

    /// Delete a saved tender. Returns `false` if it did not exist.
    pub fn delete(&self, owner: &str, id: i64) -> Result<bool> {
        let owner = require_owner(owner)?;
        let affected = self.store.execute_update(
            "DELETE FROM saved_tenders WHERE user_id = ? AND id = ?",
            duckdb::params![owner, id],
        )?;
        Ok(affected > 0)
    }

    /// The owner's collection projected for the market share calculation.
    pub fn valued(&self, owner: &str) -> Result<Vec<ValuedTender>> {
        Ok(self.list(owner)?.iter().map(SavedTender::valued).collect())
    }

    fn update_one(
        &self,
        owner: &str,
        id: i64,
        sql: &str,
        params: &[&dyn duckdb::ToSql],
    ) -> Result<SavedTender> {
        let rows = self.store.execute_into::<SavedTender>(sql, params)?;
        let updated = rows.into_iter().next().ok_or_else(|| {
            TedError::NotFound(format!("saved tender {} for {}", id, owner))
        })?;
        info!(owner, id, "Updated saved tender");
        Ok(updated)
    }
}

fn duplicate(owner: &str, ted_id: &str) -> TedError {
    TedError::DuplicateRecord {
        owner: owner.to_string(),
        ted_id: ted_id.to_string(),
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TedError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn check_value(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TedError::Validation(format!(
            "tender value {} must be a non-negative amount",
            value
        )));
    }
    Ok(())
}
