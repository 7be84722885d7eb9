//! Market share over a saved-tender collection.
//!
//! Stateless: callers recompute from their current collection after every
//! change instead of patching a cached aggregate.

use crate::models::{MarketShareCalculation, ValuedTender};

/// Sum values of countable tenders and the share held by the flagged subset.
///
/// Tenders with no value, a non-positive value, or a non-finite value are
/// excluded from both sums and both counts. Values are summed in ascending
/// order, so the result does not depend on the order of `tenders`.
pub fn compute_market_share(tenders: &[ValuedTender]) -> MarketShareCalculation {
    let mut all_values: Vec<f64> = Vec::with_capacity(tenders.len());
    let mut subset_values: Vec<f64> = Vec::new();

    for tender in tenders {
        if let Some(value) = tender.countable_value() {
            all_values.push(value);
            if tender.in_subset {
                subset_values.push(value);
            }
        }
    }

    let total_market_value = ordered_sum(&mut all_values);
    let our_sector_value = ordered_sum(&mut subset_values);

    let market_share_percentage = if total_market_value > 0.0 {
        (our_sector_value / total_market_value * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    MarketShareCalculation {
        total_market_value,
        our_sector_value,
        market_share_percentage,
        total_tenders: all_values.len(),
        our_sector_tenders: subset_values.len(),
    }
}

fn ordered_sum(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}
