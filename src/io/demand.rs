// src/io/demand.rs

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::thread_rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Customer demand before any shock or seasonality is applied.
pub const BASELINE_DEMAND: u32 = 20;

/// Peak deviation of the seasonal wave around the baseline.
pub const SEASONAL_AMPLITUDE: f64 = 12.0;

/// Half-period of the seasonal wave, in ticks.
pub const SEASONAL_HALF_PERIOD: f64 = 26.0;

/// Half-width of the stochastic noise band.
pub const NOISE_HALF_WIDTH: f64 = 9.0;

/// Shape of the external customer demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandPattern {
    /// Baseline until the shock tick, then baseline x magnitude.
    StepShock,
    /// Flat baseline.
    Stable,
    /// Sine wave with a period of about 52 ticks.
    Seasonal,
    /// Baseline plus uniform noise. Unseeded: not reproducible between runs.
    Stochastic,
}

impl DemandPattern {
    pub const ALL: [DemandPattern; 4] = [
        DemandPattern::StepShock,
        DemandPattern::Stable,
        DemandPattern::Seasonal,
        DemandPattern::Stochastic,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DemandPattern::StepShock => "STEP_SHOCK",
            DemandPattern::Stable => "STABLE",
            DemandPattern::Seasonal => "SEASONAL",
            DemandPattern::Stochastic => "STOCHASTIC",
        }
    }

    /// Whether the same tick and parameters always give the same demand.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, DemandPattern::Stochastic)
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DemandPattern {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        DemandPattern::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| SimError::UnknownPattern(s.to_string()))
    }
}

/// Customer demand at `tick` for the given pattern.
///
/// `shock_tick` and `shock_magnitude` only matter for `StepShock`.
pub fn generate_demand(
    tick: usize,
    pattern: DemandPattern,
    shock_tick: usize,
    shock_magnitude: f64,
) -> u32 {
    let base = f64::from(BASELINE_DEMAND);

    match pattern {
        DemandPattern::StepShock => {
            if tick < shock_tick {
                BASELINE_DEMAND
            } else {
                to_quantity((base * shock_magnitude).round())
            }
        }
        DemandPattern::Stable => BASELINE_DEMAND,
        DemandPattern::Seasonal => {
            let wave = SEASONAL_AMPLITUDE * (tick as f64 / SEASONAL_HALF_PERIOD * PI).sin();
            to_quantity((base + wave).round()).max(1)
        }
        DemandPattern::Stochastic => {
            let noise = Uniform::new(-NOISE_HALF_WIDTH, NOISE_HALF_WIDTH);
            let val: f64 = base + noise.sample(&mut thread_rng());
            to_quantity(val.round()).max(1)
        }
    }
}

/// Generates `ticks` consecutive demand values starting at tick 1.
pub fn generate_schedule(
    ticks: usize,
    pattern: DemandPattern,
    shock_tick: usize,
    shock_magnitude: f64,
) -> Vec<u32> {
    (1..=ticks)
        .map(|t| generate_demand(t, pattern, shock_tick, shock_magnitude))
        .collect()
}

// Demand cannot be negative.
fn to_quantity(val: f64) -> u32 {
    if val.is_nan() || val < 0.0 {
        0
    } else if val > f64::from(u32::MAX) {
        u32::MAX
    } else {
        val as u32
    }
}
