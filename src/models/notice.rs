use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TedError};

// ---------------------------------------------------------------------------
// NoticeType: Procurement stage of a record
// ---------------------------------------------------------------------------

/// Stage of a procurement record.
///
/// `Notice` is a contract notice (the announcement), `Tender` is a contract
/// award (the outcome). Records whose class matches neither are `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoticeType {
    #[default]
    Notice,
    Tender,
    Other,
}

impl NoticeType {
    /// The raw tag used in queries and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeType::Notice => "notice",
            NoticeType::Tender => "tender",
            NoticeType::Other => "other",
        }
    }

    /// Human label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            NoticeType::Notice => "Contract Notice",
            NoticeType::Tender => "Contract Award",
            NoticeType::Other => "Other",
        }
    }

    /// Fragment of the class IRI identifying this stage, if it has one.
    pub fn class_pattern(&self) -> Option<&'static str> {
        match self {
            NoticeType::Notice => Some("ContractNotice"),
            NoticeType::Tender => Some("ContractAward"),
            NoticeType::Other => None,
        }
    }

    /// Parse a bound `?type` value. Unrecognized tags map to `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "notice" => NoticeType::Notice,
            "tender" => NoticeType::Tender,
            _ => NoticeType::Other,
        }
    }
}

impl fmt::Display for NoticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SearchFilters
// ---------------------------------------------------------------------------

/// Parameters for a notice search.
///
/// All fields are optional. `None` (or a blank string) means "no
/// constraint"; `page` defaults to 1 and `page_size` to the configured
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub notice_type: Option<NoticeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpv_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords(mut self, keywords: &str) -> Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    pub fn notice_type(mut self, notice_type: NoticeType) -> Self {
        self.notice_type = Some(notice_type);
        self
    }

    pub fn date_from(mut self, date: &str) -> Self {
        self.date_from = Some(date.to_string());
        self
    }

    pub fn date_to(mut self, date: &str) -> Self {
        self.date_to = Some(date.to_string());
        self
    }

    pub fn cpv_code(mut self, code: &str) -> Self {
        self.cpv_code = Some(code.to_string());
        self
    }

    pub fn country(mut self, code: &str) -> Self {
        self.country = Some(code.to_string());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Resolve `page` / `page_size` against a default page size.
    pub fn pagination(&self, default_page_size: usize) -> Result<Pagination> {
        Pagination::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(default_page_size),
        )
    }
}

/// Trimmed value of an optional text filter, or `None` when blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A validated page request: `page >= 1`, `page_size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    offset: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Result<Self> {
        if page == 0 {
            return Err(TedError::Validation("page must be at least 1".into()));
        }
        if page_size == 0 {
            return Err(TedError::Validation("page size must be positive".into()));
        }
        let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
            TedError::Validation(format!(
                "page {} with page size {} is out of range",
                page, page_size
            ))
        })?;
        Ok(Self {
            page,
            page_size,
            offset,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `(page - 1) * page_size`
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `ceil(total / page_size)`; zero when `total` is zero.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }
}

// ---------------------------------------------------------------------------
// SearchResult: One notice row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub date: String,
    pub cpv_code: String,
    pub cpv_description: String,
    pub country: String,
    pub country_name: String,
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub uri: String,
}

// ---------------------------------------------------------------------------
// SearchResponse: One page of results plus totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// `true` when the page came from the synthetic fallback dataset rather
    /// than the endpoint.
    #[serde(default)]
    pub synthetic: bool,
}

impl SearchResponse {
    pub(crate) fn new(
        results: Vec<SearchResult>,
        total: usize,
        pagination: Pagination,
        synthetic: bool,
    ) -> Self {
        Self {
            results,
            total,
            page: pagination.page(),
            page_size: pagination.page_size(),
            total_pages: pagination.total_pages(total),
            synthetic,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first row on this page, or 0 when the page
    /// lies past the last match. A page number of 0 reads as page 1.
    pub fn first_item(&self) -> usize {
        let first = self
            .page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .saturating_add(1);
        if first > self.total {
            0
        } else {
            first
        }
    }

    /// 1-based position of the last row on this page.
    pub fn last_item(&self) -> usize {
        if self.first_item() == 0 {
            return 0;
        }
        self.page.saturating_mul(self.page_size).min(self.total)
    }

    /// Up to `width` consecutive page numbers around the current page,
    /// clamped to `1..=total_pages`.
    pub fn page_window(&self, width: usize) -> Vec<usize> {
        let count = width.min(self.total_pages);
        if count == 0 {
            return Vec::new();
        }
        let latest_start = self.total_pages - count + 1;
        let start = self
            .page
            .saturating_sub(width / 2)
            .max(1)
            .min(latest_start);
        (start..start + count).collect()
    }
}
