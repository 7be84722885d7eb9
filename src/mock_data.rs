//! Synthetic fallback dataset.
//!
//! Used only when the client is built with `fallback_on_error` and the
//! endpoint fails. Every generated page is flagged `synthetic`, every id
//! starts with `mock-`, and every record satisfies the filters it was
//! generated for. The generator is seeded from the filters and page, so a
//! repeated request yields the same page.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate, Utc};
use rand::prelude::*;

use crate::config;
use crate::models::notice::present;
use crate::models::{NoticeType, Pagination, SearchFilters, SearchResponse, SearchResult};
use crate::queries::notices::{normalize_country, parse_date, NO_DESCRIPTION, UNKNOWN_COUNTRY};

const TITLES: [&str; 10] = [
    "IT Services and Software Development Contract",
    "Construction of New Hospital Wing",
    "Supply of Medical Equipment and Devices",
    "Telecommunications Infrastructure Upgrade",
    "Energy Efficiency Renovation Project",
    "Transportation Services Contract",
    "Consultancy Services for Digital Transformation",
    "Security Services for Government Buildings",
    "Cleaning and Maintenance Services",
    "Office Supplies and Equipment Contract",
];

/// Generate the synthetic page `pagination` of a [`config::MOCK_TOTAL`]-row
/// result set matching `filters`.
pub fn synthetic_page(filters: &SearchFilters, pagination: Pagination) -> SearchResponse {
    let total = config::MOCK_TOTAL as usize;
    let rows = pagination
        .page_size()
        .min(total.saturating_sub(pagination.offset()));

    let mut rng = StdRng::seed_from_u64(seed(filters, pagination));
    let (start, span) = date_range(filters);

    let mut results: Vec<SearchResult> = (0..rows)
        .map(|i| {
            let n = pagination.offset() + i + 1;
            synthetic_record(filters, n, start, span, &mut rng)
        })
        .collect();
    results.sort_by(|a, b| b.date.cmp(&a.date));

    SearchResponse::new(results, total, pagination, true)
}

fn synthetic_record(
    filters: &SearchFilters,
    n: usize,
    start: NaiveDate,
    span: i64,
    rng: &mut StdRng,
) -> SearchResult {
    let base_title = TITLES.choose(rng).copied().unwrap_or(TITLES[0]);
    let title = match present(&filters.keywords) {
        Some(keywords) => format!("{} - {}", base_title, keywords.to_uppercase()),
        None => base_title.to_string(),
    };

    let (cpv_code, cpv_description) = pick_cpv(filters, rng);
    let (country, country_name) = pick_country(filters, rng);

    let notice_type = match filters.notice_type {
        Some(t @ (NoticeType::Notice | NoticeType::Tender)) => t,
        _ if rng.gen_bool(0.5) => NoticeType::Notice,
        _ => NoticeType::Tender,
    };

    let date = start + Duration::days(rng.gen_range(0..=span));

    SearchResult {
        id: format!("mock-{}", n),
        title,
        date: date.format("%Y-%m-%d").to_string(),
        cpv_code,
        cpv_description,
        country,
        country_name,
        notice_type,
        uri: format!("https://ted.europa.eu/udl?uri=TED:NOTICE:{}:DATA", n),
    }
}

fn pick_cpv(filters: &SearchFilters, rng: &mut StdRng) -> (String, String) {
    let codes = config::cpv_codes();
    let prefix = present(&filters.cpv_code).unwrap_or("");
    let matching: Vec<_> = codes.iter().filter(|(c, _)| c.starts_with(prefix)).collect();
    match matching.choose(rng) {
        Some((code, description)) => (code.to_string(), description.to_string()),
        // A prefix finer than any known division: pad it out to a full code.
        None => (format!("{:0<8}", prefix), NO_DESCRIPTION.to_string()),
    }
}

fn pick_country(filters: &SearchFilters, rng: &mut StdRng) -> (String, String) {
    if let Some(code) = present(&filters.country).and_then(|c| normalize_country(c).ok()) {
        let name = config::country_name(&code).unwrap_or(UNKNOWN_COUNTRY).to_string();
        return (code, name);
    }
    let countries = config::countries();
    let (_, code, name) = countries
        .choose(rng)
        .copied()
        .unwrap_or(("DE", "DEU", "Germany"));
    (code.to_string(), name.to_string())
}

/// First eligible date and the number of further days available.
fn date_range(filters: &SearchFilters) -> (NaiveDate, i64) {
    let parsed = |v: &Option<String>| present(v).and_then(|d| parse_date(d).ok());
    let end = parsed(&filters.date_to).unwrap_or_else(|| Utc::now().date_naive());
    let start = parsed(&filters.date_from).unwrap_or(end - Duration::days(365));
    if start > end {
        return (start, 0);
    }
    (start, (end - start).num_days())
}

fn seed(filters: &SearchFilters, pagination: Pagination) -> u64 {
    let mut hasher = DefaultHasher::new();
    filters.hash(&mut hasher);
    pagination.page().hash(&mut hasher);
    pagination.page_size().hash(&mut hasher);
    hasher.finish()
}
