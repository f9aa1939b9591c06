// src/simulation/metrics.rs

//! Volatility and service metrics derived from a run's history.

use serde::{Deserialize, Serialize};

use crate::simulation::engine::HistoryRecord;

/// Fewer records than this and every ratio reports 1.0.
pub const MIN_BULLWHIP_SAMPLES: usize = 5;

/// Stand-in for the demand CoV when customer demand is perfectly flat.
pub const DEMAND_COV_FLOOR: f64 = 0.001;

/// Order-variance amplification per tier relative to customer demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BullwhipRatios {
    pub retailer: f64,
    pub wholesaler: f64,
    pub factory: f64,
}

impl Default for BullwhipRatios {
    /// No distortion.
    fn default() -> Self {
        Self {
            retailer: 1.0,
            wholesaler: 1.0,
            factory: 1.0,
        }
    }
}

/// Population standard deviation over mean. 0 for an empty or zero-mean series.
pub fn coef_var(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

/// Bullwhip ratio per tier: CoV of that tier's orders over CoV of demand,
/// rounded to two decimals.
pub fn compute_bullwhip(history: &[HistoryRecord]) -> BullwhipRatios {
    if history.len() < MIN_BULLWHIP_SAMPLES {
        return BullwhipRatios::default();
    }

    let series = |f: fn(&HistoryRecord) -> u32| -> Vec<f64> {
        history.iter().map(|h| f64::from(f(h))).collect()
    };

    let demand_cov = match coef_var(&series(|h| h.customer_demand)) {
        cov if cov == 0.0 => DEMAND_COV_FLOOR,
        cov => cov,
    };
    let ratio = |orders: Vec<f64>| round_to(coef_var(&orders) / demand_cov, 2);

    BullwhipRatios {
        retailer: ratio(series(|h| h.retailer.last_order_placed)),
        wholesaler: ratio(series(|h| h.wholesaler.last_order_placed)),
        factory: ratio(series(|h| h.factory.last_order_placed)),
    }
}

/// Mean on-hand inventory across all three tiers and all ticks.
pub fn average_inventory(history: &[HistoryRecord]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: u64 = history
        .iter()
        .flat_map(|h| h.tiers())
        .map(|s| u64::from(s.inventory))
        .sum();
    total as f64 / history.len() as f64 / 3.0
}

/// Largest order the factory placed over the history.
pub fn factory_peak(history: &[HistoryRecord]) -> u32 {
    history
        .iter()
        .map(|h| h.factory.last_order_placed)
        .max()
        .unwrap_or(0)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
