// src/simulation/analysis.rs

//! Batches of independent runs used to compare policies.
//!
//! Runs share no state, so every batch fans out over the rayon pool.
//! Results keep a stable order: `Policy::ALL`, then `Scenario::ALL`.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::simulation::config::{Scenario, ScenarioConfig, RUN_TICKS};
use crate::simulation::engine::{run_full_sim, RunResult};
use crate::strategy::policy::Policy;

/// Shock magnitudes swept by [`sensitivity_sweep`].
pub const SENSITIVITY_MAGNITUDES: [f64; 9] = [1.1, 1.3, 1.5, 1.8, 2.0, 2.5, 3.0, 3.5, 4.0];

/// Shock tick used by [`sensitivity_sweep`].
pub const SENSITIVITY_SHOCK_TICK: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    pub magnitude: f64,
    /// Factory bullwhip ratio per policy.
    pub factory_bullwhip: BTreeMap<Policy, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub policy: Policy,
    /// Factory bullwhip ratio per scenario preset.
    pub cells: BTreeMap<Scenario, f64>,
}

/// 0-100 scores where higher is better on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarScores {
    pub policy: Policy,
    pub stability: f64,
    pub service_level: f64,
    pub low_inventory: f64,
    pub no_stockout: f64,
    pub peak_control: f64,
}

/// Factory orders of every compared policy on one tick, next to demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRow {
    pub tick: usize,
    pub demand: u32,
    pub factory_orders: BTreeMap<Policy, u32>,
}

/// One full run per policy on the same scenario.
pub fn compare_policies(config: &ScenarioConfig) -> Vec<RunResult> {
    Policy::ALL
        .par_iter()
        .map(|&policy| run_full_sim(policy, config))
        .collect()
}

/// Factory bullwhip per policy as the step-shock magnitude grows.
///
/// Lead times come from `base`; demand is always a step shock at tick 15.
pub fn sensitivity_sweep(base: &ScenarioConfig) -> Vec<SensitivityRow> {
    let rows: Vec<SensitivityRow> = SENSITIVITY_MAGNITUDES
        .par_iter()
        .map(|&magnitude| {
            let config = base.with_step_shock(SENSITIVITY_SHOCK_TICK, magnitude);
            let factory_bullwhip = Policy::ALL
                .iter()
                .map(|&policy| (policy, run_full_sim(policy, &config).bullwhip.factory))
                .collect();
            SensitivityRow {
                magnitude,
                factory_bullwhip,
            }
        })
        .collect();

    info!(points = rows.len(), "sensitivity sweep complete");
    rows
}

/// Factory bullwhip for every policy x scenario preset.
pub fn policy_heatmap() -> Vec<HeatmapRow> {
    let rows: Vec<HeatmapRow> = Policy::ALL
        .par_iter()
        .map(|&policy| HeatmapRow {
            policy,
            cells: Scenario::ALL
                .par_iter()
                .map(|&scenario| (scenario, run_full_sim(policy, &scenario.config()).bullwhip.factory))
                .collect(),
        })
        .collect();

    info!(policies = rows.len(), scenarios = Scenario::ALL.len(), "heatmap complete");
    rows
}

/// Scores each result relative to the worst performer in the set.
pub fn radar_scores(results: &[RunResult]) -> Vec<RadarScores> {
    let max_of = |f: fn(&RunResult) -> f64| {
        let max = results.iter().map(f).fold(0.0_f64, f64::max);
        if max > 0.0 {
            max
        } else {
            1.0
        }
    };
    let max_bw = max_of(|r| r.bullwhip.factory);
    let max_inv = max_of(|r| r.avg_inv);
    let max_stockouts = max_of(|r| r.stockouts as f64);
    let max_peak = max_of(|r| f64::from(r.factory_peak));

    let inverse = |value: f64, max: f64| (100.0 - value / max * 100.0).round();

    results
        .iter()
        .map(|r| RadarScores {
            policy: r.policy,
            stability: inverse(r.bullwhip.factory, max_bw),
            service_level: r.service_level.round(),
            low_inventory: inverse(r.avg_inv, max_inv),
            no_stockout: inverse(r.stockouts as f64, max_stockouts),
            peak_control: inverse(f64::from(r.factory_peak), max_peak),
        })
        .collect()
}

/// Factory order series of each result, tick by tick, against the first
/// result's customer demand.
pub fn order_overlay(results: &[RunResult]) -> Vec<OverlayRow> {
    (0..RUN_TICKS)
        .map(|i| OverlayRow {
            tick: i + 1,
            demand: results
                .first()
                .and_then(|r| r.history.get(i))
                .map_or(0, |h| h.customer_demand),
            factory_orders: results
                .iter()
                .map(|r| {
                    let order = r.history.get(i).map_or(0, |h| h.factory.last_order_placed);
                    (r.policy, order)
                })
                .collect(),
        })
        .collect()
}
