use serde::{Deserialize, Serialize};

use super::notice::SearchResult;
use crate::config;

// ---------------------------------------------------------------------------
// SavedTender: A notice saved by an owner (row of `saved_tenders`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTender {
    pub id: i64,
    pub user_id: String,
    pub ted_id: String,
    pub title: String,
    pub date: String,
    pub cpv_code: Option<String>,
    pub cpv_description: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub notice_type: Option<String>,
    pub uri: Option<String>,
    pub tender_value: Option<f64>,
    pub currency: Option<String>,
    pub is_our_sector: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SavedTender {
    /// Project onto the fields the market share calculation reads.
    pub fn valued(&self) -> ValuedTender {
        ValuedTender::new(self.id, self.tender_value, self.is_our_sector)
    }
}

// ---------------------------------------------------------------------------
// NewSavedTender: Insert payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavedTender {
    pub ted_id: String,
    pub title: String,
    pub date: String,
    pub cpv_code: Option<String>,
    pub cpv_description: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub notice_type: Option<String>,
    pub uri: Option<String>,
    pub tender_value: Option<f64>,
    pub currency: String,
    pub is_our_sector: bool,
    pub notes: Option<String>,
}

impl NewSavedTender {
    pub fn new(ted_id: &str, title: &str, date: &str) -> Self {
        Self {
            ted_id: ted_id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            cpv_code: None,
            cpv_description: None,
            country: None,
            country_name: None,
            notice_type: None,
            uri: None,
            tender_value: None,
            currency: config::DEFAULT_CURRENCY.to_string(),
            is_our_sector: false,
            notes: None,
        }
    }

    /// Copy every field of a search hit; value and sector flag start unset.
    pub fn from_result(result: &SearchResult) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            cpv_code: non_empty(&result.cpv_code),
            cpv_description: non_empty(&result.cpv_description),
            country: non_empty(&result.country),
            country_name: non_empty(&result.country_name),
            notice_type: Some(result.notice_type.as_str().to_string()),
            uri: non_empty(&result.uri),
            ..Self::new(&result.id, &result.title, &result.date)
        }
    }

    pub fn value(mut self, value: f64, currency: &str) -> Self {
        self.tender_value = Some(value);
        self.currency = currency.to_string();
        self
    }

    pub fn our_sector(mut self, flag: bool) -> Self {
        self.is_our_sector = flag;
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// ValuedTender: Input row for the market share calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuedTender {
    pub id: i64,
    pub value: Option<f64>,
    pub in_subset: bool,
}

impl ValuedTender {
    pub fn new(id: i64, value: Option<f64>, in_subset: bool) -> Self {
        Self {
            id,
            value,
            in_subset,
        }
    }

    /// The value when it counts towards market totals (finite and > 0).
    pub fn countable_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite() && *v > 0.0)
    }
}
