//! Notice search against the SPARQL endpoint.
//!
//! A search is two requests: a count query sizes the result set, then a data
//! query fetches one page. Both are generated from the same
//! [`SearchFilters`], so they always agree on which notices match. The data
//! query groups by notice, so a notice with several classes or labels still
//! fills exactly one row and pages step through the same set the count
//! measured.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config;
use crate::endpoint::{Binding, QueryEndpoint, SparqlResults};
use crate::error::{QueryPhase, Result, TedError};
use crate::mock_data;
use crate::models::notice::present;
use crate::models::{NoticeType, Pagination, SearchFilters, SearchResponse, SearchResult};
use crate::session::SearchSession;
use crate::sparql_builder::SparqlBuilder;

/// Data query projection, in column order. Grouped by notice, so every
/// column other than `?notice` is folded to one value.
const RESULT_PROJECTION: [&str; 8] = [
    "?notice",
    "(SAMPLE(?noticeTitle) AS ?title)",
    "(MAX(?issued) AS ?date)",
    "(SAMPLE(?cpv) AS ?cpvCode)",
    "(SAMPLE(?cpvLabel) AS ?cpvDescription)",
    "(SAMPLE(?countryIri) AS ?country)",
    "(SAMPLE(?countryLabel) AS ?countryName)",
    "(STRAFTER(MIN(?typeRank), \":\") AS ?type)",
];

/// Label language kept for CPV and country descriptions.
const LABEL_LANGUAGE: &str = "en";

pub const UNTITLED: &str = "Untitled Notice";
pub const NO_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// SearchSettings
// ---------------------------------------------------------------------------

/// Search behaviour fixed at client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub default_page_size: usize,
    /// Substitute the labelled synthetic dataset when the endpoint fails,
    /// instead of returning the error.
    pub fallback_on_error: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: config::DEFAULT_PAGE_SIZE,
            fallback_on_error: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// Build the count query (`count_only`) or the unpaginated data query.
///
/// Every caller-supplied value is validated or escaped; invalid dates, CPV
/// codes or country codes are rejected with [`TedError::Validation`].
pub fn build_query(filters: &SearchFilters, count_only: bool) -> Result<String> {
    Ok(builder_for(filters, count_only)?.build())
}

/// Build the data query for one page: `LIMIT page_size OFFSET (page-1)*page_size`.
pub fn build_page_query(filters: &SearchFilters, pagination: Pagination) -> Result<String> {
    Ok(builder_for(filters, false)?
        .limit(pagination.page_size())
        .offset(pagination.offset())
        .build())
}

fn builder_for(filters: &SearchFilters, count_only: bool) -> Result<SparqlBuilder> {
    let mut qb = SparqlBuilder::new();
    for (name, iri) in config::sparql_prefixes() {
        qb.prefix(name, iri);
    }

    if count_only {
        qb.select(&["(COUNT(DISTINCT ?notice) AS ?total)"]);
    } else {
        qb.select(&RESULT_PROJECTION);
    }

    let cpv_link = format!("?notice {} ?cpv .", config::CPV_PATH);
    let cpv_label = labelled("?cpv", "?cpvLabel");
    let country_link = format!("?notice {} ?countryIri .", config::COUNTRY_PATH);
    let country_label = labelled("?countryIri", "?countryLabel");
    qb.pattern("?notice a ?noticeType ;")
        .pattern("        rdfs:label ?noticeTitle ;")
        .pattern("        dct:issued ?issued .")
        .optional(&[cpv_link.as_str(), cpv_label.as_str()])
        .optional(&[country_link.as_str(), country_label.as_str()])
        .bind(&type_rank_expression(), "?typeRank");

    apply_filters(&mut qb, filters)?;

    if !count_only {
        qb.group_by(&["?notice"])
            .order_by(&["DESC(?date)", "?notice"]);
    }

    Ok(qb)
}

/// Nested `OPTIONAL` binding the English label of `subject`.
fn labelled(subject: &str, label: &str) -> String {
    format!(
        "OPTIONAL {{ {} rdfs:label {} . FILTER(LANGMATCHES(LANG({}), \"{}\")) }}",
        subject, label, label, LABEL_LANGUAGE
    )
}

/// Ranked type tag, `"1:notice"`, `"2:tender"` or `"3:other"`. The data
/// query keeps the lowest rank per notice and strips the prefix.
fn type_rank_expression() -> String {
    let test = |t: NoticeType| {
        format!(
            "CONTAINS(STR(?noticeType), \"{}\")",
            t.class_pattern().unwrap_or_default()
        )
    };
    format!(
        "IF({}, \"1:{}\", IF({}, \"2:{}\", \"3:{}\"))",
        test(NoticeType::Notice),
        NoticeType::Notice,
        test(NoticeType::Tender),
        NoticeType::Tender,
        NoticeType::Other
    )
}

/// One FILTER per present field.
fn apply_filters(qb: &mut SparqlBuilder, filters: &SearchFilters) -> Result<()> {
    if let Some(keywords) = present(&filters.keywords) {
        qb.filter_contains_ci("?noticeTitle", keywords);
    }

    if let Some(notice_type) = filters.notice_type {
        let pattern = notice_type.class_pattern().ok_or_else(|| {
            TedError::Validation("type filter must be 'notice' or 'tender'".into())
        })?;
        qb.filter_contains("?noticeType", pattern);
    }

    let date_from = present(&filters.date_from).map(parse_date).transpose()?;
    let date_to = present(&filters.date_to).map(parse_date).transpose()?;
    if let (Some(from), Some(to)) = (date_from, date_to) {
        if from > to {
            return Err(TedError::Validation(format!(
                "date range is empty: {} is after {}",
                from, to
            )));
        }
    }
    if let Some(from) = date_from {
        qb.filter_date_gte("?issued", &from.format("%Y-%m-%d").to_string());
    }
    if let Some(to) = date_to {
        qb.filter_date_lte("?issued", &to.format("%Y-%m-%d").to_string());
    }

    if let Some(cpv) = present(&filters.cpv_code) {
        validate_cpv_prefix(cpv)?;
        qb.filter_starts_with("REPLACE(STR(?cpv), \"^.*/\", \"\")", cpv);
    }

    if let Some(country) = present(&filters.country) {
        let code = normalize_country(country)?;
        qb.filter_eq_iri(
            "?countryIri",
            &format!("{}{}", config::COUNTRY_AUTHORITY_BASE, code),
        )?;
    }

    Ok(())
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        TedError::Validation(format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

pub(crate) fn validate_cpv_prefix(cpv: &str) -> Result<()> {
    let valid = cpv.chars().next().is_some_and(|c| c.is_ascii_digit())
        && cpv.chars().all(|c| c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TedError::Validation(format!(
            "'{}' is not a CPV code prefix",
            cpv
        )))
    }
}

/// Resolve a country code to its authority code.
///
/// Three-letter codes are taken as authority codes directly. Two-letter codes
/// must be in [`config::countries`] and are mapped to their alpha-3 form.
pub(crate) fn normalize_country(code: &str) -> Result<String> {
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TedError::Validation(format!(
            "'{}' is not a country code",
            code
        )));
    }
    match code.len() {
        3 => Ok(code.to_ascii_uppercase()),
        2 => config::country_authority_code(code)
            .map(str::to_string)
            .ok_or_else(|| TedError::Validation(format!("unknown country code '{}'", code))),
        _ => Err(TedError::Validation(format!(
            "'{}' is not a country code",
            code
        ))),
    }
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

/// Read `?total` from a count response. No solutions means zero matches.
pub fn parse_count(results: &SparqlResults) -> Result<usize> {
    let Some(term) = results.bindings().first().and_then(|b| b.get("total")) else {
        return Ok(0);
    };
    term.value.trim().parse::<usize>().map_err(|_| TedError::InvalidResponse {
        phase: QueryPhase::Count,
        message: format!("total '{}' is not a count", term.value),
    })
}

/// Map one data-query solution onto a [`SearchResult`], defaulting unbound
/// variables.
pub fn map_binding(binding: &Binding) -> SearchResult {
    let value = |var: &str| {
        binding
            .get(var)
            .map(|t| t.value.trim())
            .filter(|v| !v.is_empty())
    };

    let uri = value("notice").unwrap_or_default();
    SearchResult {
        id: value("notice")
            .map(trailing_segment)
            .unwrap_or(UNKNOWN)
            .to_string(),
        title: value("title").unwrap_or(UNTITLED).to_string(),
        date: value("date")
            .and_then(|d| d.split('T').next())
            .unwrap_or(UNKNOWN)
            .to_string(),
        cpv_code: value("cpvCode")
            .map(trailing_segment)
            .unwrap_or_default()
            .to_string(),
        cpv_description: value("cpvDescription")
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        country: value("country")
            .map(trailing_segment)
            .unwrap_or_default()
            .to_string(),
        country_name: value("countryName")
            .unwrap_or(UNKNOWN_COUNTRY)
            .to_string(),
        notice_type: value("type")
            .map(NoticeType::from_tag)
            .unwrap_or_default(),
        uri: uri.to_string(),
    }
}

/// Last path or fragment segment of an IRI: `http://x/cpv/72000000` -> `72000000`.
pub fn trailing_segment(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#']);
    trimmed
        .rsplit(['/', '#'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed)
}

// ---------------------------------------------------------------------------
// NoticeQuery
// ---------------------------------------------------------------------------

/// Query interface for procurement notices on the SPARQL endpoint.
pub struct NoticeQuery<'a> {
    endpoint: &'a dyn QueryEndpoint,
    settings: SearchSettings,
}

impl<'a> NoticeQuery<'a> {
    pub fn new(endpoint: &'a dyn QueryEndpoint, settings: SearchSettings) -> Self {
        Self { endpoint, settings }
    }

    /// Run the count + data protocol for one page.
    ///
    /// Filter validation errors are always returned. Endpoint failures are
    /// returned as phase-tagged errors, or, with `fallback_on_error`,
    /// replaced by a synthetic page whose `synthetic` flag is set.
    pub fn search(&self, filters: &SearchFilters) -> Result<SearchResponse> {
        let pagination = filters.pagination(self.settings.default_page_size)?;
        let count_query = build_query(filters, true)?;
        let data_query = build_page_query(filters, pagination)?;

        match self.run(&count_query, &data_query, pagination) {
            Ok(response) => {
                info!(
                    total = response.total,
                    page = response.page,
                    rows = response.results.len(),
                    "Search completed"
                );
                Ok(response)
            }
            Err(err) if self.settings.fallback_on_error => {
                warn!(error = %err, "SPARQL endpoint failed, using synthetic results");
                Ok(mock_data::synthetic_page(filters, pagination))
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch every match in a single data page.
    ///
    /// Runs a normal first-page search to learn the total, then re-queries
    /// with the page size set to that total when more rows exist.
    pub fn fetch_all(&self, filters: &SearchFilters) -> Result<SearchResponse> {
        let first = self.search(&filters.clone().page(1))?;
        if first.total <= first.results.len() {
            return Ok(first);
        }
        self.search(&filters.clone().page(1).page_size(first.total))
    }

    /// Search within a session, returning `None` if a newer search was
    /// started on the same session before this one finished.
    pub fn search_in_session(
        &self,
        session: &SearchSession,
        filters: &SearchFilters,
    ) -> Result<Option<SearchResponse>> {
        let ticket = session.begin();
        let outcome = self.search(filters);
        if !session.is_current(ticket) {
            debug!(ticket = ticket.id(), "Dropping stale search response");
            return Ok(None);
        }
        outcome.map(Some)
    }

    fn run(
        &self,
        count_query: &str,
        data_query: &str,
        pagination: Pagination,
    ) -> Result<SearchResponse> {
        debug!(query = count_query, "Count query");
        let count = self
            .endpoint
            .select(count_query)
            .map_err(|f| f.into_error(QueryPhase::Count))?;
        let total = parse_count(&count)?;

        if total == 0 {
            return Ok(SearchResponse::new(Vec::new(), 0, pagination, false));
        }

        debug!(query = data_query, "Data query");
        let data = self
            .endpoint
            .select(data_query)
            .map_err(|f| f.into_error(QueryPhase::Data))?;
        let mut seen = HashSet::new();
        let results: Vec<SearchResult> = data
            .bindings()
            .iter()
            .map(map_binding)
            .filter(|r| r.uri.is_empty() || seen.insert(r.uri.clone()))
            .collect();

        Ok(SearchResponse::new(results, total, pagination, false))
    }
}
