use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MarketShareCalculation: Aggregate over a saved-tender collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarketShareCalculation {
    pub total_market_value: f64,
    pub our_sector_value: f64,
    pub market_share_percentage: f64,
    pub total_tenders: usize,
    pub our_sector_tenders: usize,
}

impl MarketShareCalculation {
    /// Percentage rounded to two decimals, e.g. `"25.00"`.
    pub fn percentage_display(&self) -> String {
        format!("{:.2}", self.market_share_percentage)
    }
}

// ---------------------------------------------------------------------------
// MarketAnalysis: A saved calculation (row of `market_analysis`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub id: i64,
    pub user_id: String,
    pub analysis_name: String,
    pub description: Option<String>,
    pub total_market_value: Option<f64>,
    pub our_sector_value: Option<f64>,
    pub market_share_percentage: Option<f64>,
    pub countries: Vec<String>,
    pub cpv_codes: Vec<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ---------------------------------------------------------------------------
// NewMarketAnalysis: Save request; figures are computed at save time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMarketAnalysis {
    pub analysis_name: String,
    pub description: Option<String>,
    pub countries: Vec<String>,
    pub cpv_codes: Vec<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl NewMarketAnalysis {
    pub fn new(name: &str) -> Self {
        Self {
            analysis_name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn countries(mut self, codes: &[&str]) -> Self {
        self.countries = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn cpv_codes(mut self, codes: &[&str]) -> Self {
        self.cpv_codes = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn period(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(str::to_string);
        self.date_to = to.map(str::to_string);
        self
    }
}
