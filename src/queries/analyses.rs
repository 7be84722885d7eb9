//! Market share calculations and the owner's saved analyses.

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, TedError};
use crate::market_share::compute_market_share;
use crate::models::{MarketAnalysis, MarketShareCalculation, NewMarketAnalysis};
use crate::queries::notices::{normalize_country, parse_date, validate_cpv_prefix};
use crate::queries::{require_owner, TenderQuery};
use crate::store::{join_list, now_timestamp, split_list, Store};

/// Row shape of `market_analysis`; list columns are stored joined.
#[derive(Debug, Deserialize)]
struct AnalysisRow {
    id: i64,
    user_id: String,
    analysis_name: String,
    description: Option<String>,
    total_market_value: Option<f64>,
    our_sector_value: Option<f64>,
    market_share_percentage: Option<f64>,
    countries: Option<String>,
    cpv_codes: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<AnalysisRow> for MarketAnalysis {
    fn from(row: AnalysisRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            analysis_name: row.analysis_name,
            description: row.description,
            total_market_value: row.total_market_value,
            our_sector_value: row.our_sector_value,
            market_share_percentage: row.market_share_percentage,
            countries: split_list(row.countries.as_deref()),
            cpv_codes: split_list(row.cpv_codes.as_deref()),
            date_from: row.date_from,
            date_to: row.date_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisQuery
// ---------------------------------------------------------------------------

/// Query interface for market share analyses.
pub struct AnalysisQuery<'a> {
    store: &'a Store,
}

impl<'a> AnalysisQuery<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Compute the market share over the owner's current saved tenders.
    pub fn calculate(&self, owner: &str) -> Result<MarketShareCalculation> {
        let tenders = TenderQuery::new(self.store).valued(owner)?;
        Ok(compute_market_share(&tenders))
    }

    /// Compute a fresh calculation and store it under the given name.
    pub fn save(&self, owner: &str, analysis: &NewMarketAnalysis) -> Result<MarketAnalysis> {
        let owner = require_owner(owner)?;
        let name = analysis.analysis_name.trim();
        if name.is_empty() {
            return Err(TedError::Validation("analysis name is required".into()));
        }
        let countries = analysis
            .countries
            .iter()
            .map(|c| normalize_country(c.trim()))
            .collect::<Result<Vec<_>>>()?;
        let cpv_codes = analysis
            .cpv_codes
            .iter()
            .map(|c| {
                let code = c.trim();
                validate_cpv_prefix(code).map(|_| code.to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        for date in [&analysis.date_from, &analysis.date_to].into_iter().flatten() {
            parse_date(date)?;
        }

        let calc = self.calculate(owner)?;
        let now = now_timestamp();
        let description = analysis
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let rows = self.store.execute_into::<AnalysisRow>(
            "INSERT INTO market_analysis (\
                user_id, analysis_name, description, total_market_value, our_sector_value, \
                market_share_percentage, countries, cpv_codes, date_from, date_to, \
                created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
            duckdb::params![
                owner,
                name,
                description,
                calc.total_market_value,
                calc.our_sector_value,
                calc.market_share_percentage,
                join_list(&countries),
                join_list(&cpv_codes),
                analysis.date_from,
                analysis.date_to,
                now,
                now,
            ],
        )?;

        let saved: MarketAnalysis = rows
            .into_iter()
            .next()
            .map(MarketAnalysis::from)
            .ok_or_else(|| TedError::NotFound(format!("analysis '{}' was not returned", name)))?;

        info!(
            owner,
            name,
            share = %calc.percentage_display(),
            "Saved market analysis"
        );
        Ok(saved)
    }

    /// The owner's saved analyses, newest first.
    pub fn list(&self, owner: &str) -> Result<Vec<MarketAnalysis>> {
        let owner = require_owner(owner)?;
        let rows = self.store.execute_into::<AnalysisRow>(
            "SELECT * FROM market_analysis WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC",
            duckdb::params![owner],
        )?;
        Ok(rows.into_iter().map(MarketAnalysis::from).collect())
    }

    pub fn get(&self, owner: &str, id: i64) -> Result<Option<MarketAnalysis>> {
        let owner = require_owner(owner)?;
        let rows = self.store.execute_into::<AnalysisRow>(
            "SELECT * FROM market_analysis WHERE user_id = ? AND id = ?",
            duckdb::params![owner, id],
        )?;
        Ok(rows.into_iter().next().map(MarketAnalysis::from))
    }

    pub fn delete(&self, owner: &str, id: i64) -> Result<bool> {
        let owner = require_owner(owner)?;
        let affected = self.store.execute_update(
            "DELETE FROM market_analysis WHERE user_id = ? AND id = ?",
            duckdb::params![owner, id],
        )?;
        Ok(affected > 0)
    }
}
