// src/simulation/config.rs

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::io::demand::DemandPattern;
use crate::model::agent::TierRole;
use crate::strategy::policy::{Policy, PolicyParams};

/// Length of a full batch run.
pub const RUN_TICKS: usize = 100;

/// Starting on-hand stock for every tier.
pub const INITIAL_INVENTORY: u32 = 60;

/// Largest accepted step-shock multiplier.
pub const MAX_SHOCK_MAGNITUDE: f64 = 100.0;

/// Demand shape plus the per-tier lead times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub demand_pattern: DemandPattern,
    pub shock_tick: usize,
    pub shock_magnitude: f64,
    pub retailer_lead_time: usize,
    pub wholesaler_lead_time: usize,
    pub factory_lead_time: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Scenario::CovidShock.config()
    }
}

impl ScenarioConfig {
    pub fn lead_time(&self, role: TierRole) -> usize {
        match role {
            TierRole::Retailer => self.retailer_lead_time,
            TierRole::Wholesaler => self.wholesaler_lead_time,
            TierRole::Factory => self.factory_lead_time,
        }
    }

    pub fn total_lead_time(&self) -> usize {
        TierRole::ALL.iter().map(|&r| self.lead_time(r)).sum()
    }

    /// Same lead times, demand replaced by a step shock at `shock_tick`.
    pub fn with_step_shock(&self, shock_tick: usize, shock_magnitude: f64) -> Self {
        Self {
            demand_pattern: DemandPattern::StepShock,
            shock_tick,
            shock_magnitude,
            ..self.clone()
        }
    }

    /// Lead times below 1 are accepted (the pipeline clamps them); lead times
    /// longer than the run are not.
    pub fn validate(&self) -> Result<()> {
        if !(self.shock_magnitude > 0.0 && self.shock_magnitude <= MAX_SHOCK_MAGNITUDE) {
            return Err(SimError::InvalidConfig(format!(
                "shock magnitude must be in (0, {MAX_SHOCK_MAGNITUDE}], got {}",
                self.shock_magnitude
            )));
        }
        if self.shock_tick == 0 {
            return Err(SimError::InvalidConfig("shock tick starts at 1".into()));
        }
        if let Some(role) = TierRole::ALL
            .into_iter()
            .find(|&r| self.lead_time(r) > RUN_TICKS)
        {
            return Err(SimError::InvalidConfig(format!(
                "{} lead time {} exceeds the {RUN_TICKS}-tick run",
                role.name(),
                self.lead_time(role)
            )));
        }
        Ok(())
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }
}

/// Built-in demand scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scenario {
    CovidShock,
    Seasonal,
    Stable,
    NoiseStorm,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::CovidShock,
        Scenario::Seasonal,
        Scenario::Stable,
        Scenario::NoiseStorm,
    ];

    pub fn config(self) -> ScenarioConfig {
        let (demand_pattern, shock_tick, shock_magnitude, lead_times) = match self {
            Scenario::CovidShock => (DemandPattern::StepShock, 15, 2.5, (2, 4, 6)),
            Scenario::Seasonal => (DemandPattern::Seasonal, 20, 1.5, (2, 3, 4)),
            Scenario::Stable => (DemandPattern::Stable, 50, 1.0, (2, 3, 4)),
            Scenario::NoiseStorm => (DemandPattern::Stochastic, 99, 1.0, (2, 3, 4)),
        };
        ScenarioConfig {
            demand_pattern,
            shock_tick,
            shock_magnitude,
            retailer_lead_time: lead_times.0,
            wholesaler_lead_time: lead_times.1,
            factory_lead_time: lead_times.2,
        }
    }

    /// First preset driven by `pattern`, falling back to `Stable`.
    pub fn for_pattern(pattern: DemandPattern) -> Self {
        Scenario::ALL
            .into_iter()
            .find(|s| s.config().demand_pattern == pattern)
            .unwrap_or(Scenario::Stable)
    }

    pub fn id(self) -> &'static str {
        match self {
            Scenario::CovidShock => "COVID_SHOCK",
            Scenario::Seasonal => "SEASONAL",
            Scenario::Stable => "STABLE",
            Scenario::NoiseStorm => "NOISE_STORM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::CovidShock => "COVID Demand Shock",
            Scenario::Seasonal => "Seasonal Ramp",
            Scenario::Stable => "Stable Baseline",
            Scenario::NoiseStorm => "Noise Storm",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::CovidShock => "Sudden x2.5 spike at tick 15, mimicking panic-buying disruption.",
            Scenario::Seasonal => {
                "Sinusoidal wave; a holiday demand cycle that rewards anticipatory policies."
            }
            Scenario::Stable => "Flat demand; verifies steady-state stability and zero drift.",
            Scenario::NoiseStorm => "High-variance stochastic demand under maximum uncertainty.",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.id() == normalized)
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}

/// Settings for an interactive session: a policy per tier and a tick speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveConfig {
    pub retailer_policy: Policy,
    pub wholesaler_policy: Policy,
    pub factory_policy: Policy,
    #[serde(flatten)]
    pub scenario: ScenarioConfig,
    pub initial_inventory: u32,
    /// Milliseconds between ticks.
    pub speed_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            retailer_policy: Policy::Naive,
            wholesaler_policy: Policy::Naive,
            factory_policy: Policy::Naive,
            scenario: ScenarioConfig {
                demand_pattern: DemandPattern::StepShock,
                shock_tick: 20,
                shock_magnitude: 2.2,
                retailer_lead_time: 2,
                wholesaler_lead_time: 3,
                factory_lead_time: 4,
            },
            initial_inventory: INITIAL_INVENTORY,
            speed_ms: 250,
        }
    }
}

impl LiveConfig {
    pub fn policy(&self, role: TierRole) -> Policy {
        match role {
            TierRole::Retailer => self.retailer_policy,
            TierRole::Wholesaler => self.wholesaler_policy,
            TierRole::Factory => self.factory_policy,
        }
    }

    pub fn policies(&self) -> [Policy; 3] {
        TierRole::ALL.map(|r| self.policy(r))
    }

    pub fn validate(&self) -> Result<()> {
        self.scenario.validate()?;
        if self.speed_ms == 0 {
            return Err(SimError::InvalidConfig("speed must be at least 1 ms".into()));
        }
        Ok(())
    }

    /// Keys missing from the file keep their [`LiveConfig::default`] value.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let overrides: LiveConfigOverrides = toml::from_str(text)?;
        let config = overrides.apply(Self::default());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

// Flat file layout for `LiveConfig`; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LiveConfigOverrides {
    retailer_policy: Option<Policy>,
    wholesaler_policy: Option<Policy>,
    factory_policy: Option<Policy>,
    demand_pattern: Option<DemandPattern>,
    shock_tick: Option<usize>,
    shock_magnitude: Option<f64>,
    retailer_lead_time: Option<usize>,
    wholesaler_lead_time: Option<usize>,
    factory_lead_time: Option<usize>,
    initial_inventory: Option<u32>,
    speed_ms: Option<u64>,
}

impl LiveConfigOverrides {
    fn apply(self, base: LiveConfig) -> LiveConfig {
        let scenario = ScenarioConfig {
            demand_pattern: self.demand_pattern.unwrap_or(base.scenario.demand_pattern),
            shock_tick: self.shock_tick.unwrap_or(base.scenario.shock_tick),
            shock_magnitude: self.shock_magnitude.unwrap_or(base.scenario.shock_magnitude),
            retailer_lead_time: self
                .retailer_lead_time
                .unwrap_or(base.scenario.retailer_lead_time),
            wholesaler_lead_time: self
                .wholesaler_lead_time
                .unwrap_or(base.scenario.wholesaler_lead_time),
            factory_lead_time: self.factory_lead_time.unwrap_or(base.scenario.factory_lead_time),
        };
        LiveConfig {
            retailer_policy: self.retailer_policy.unwrap_or(base.retailer_policy),
            wholesaler_policy: self.wholesaler_policy.unwrap_or(base.wholesaler_policy),
            factory_policy: self.factory_policy.unwrap_or(base.factory_policy),
            scenario,
            initial_inventory: self.initial_inventory.unwrap_or(base.initial_inventory),
            speed_ms: self.speed_ms.unwrap_or(base.speed_ms),
        }
    }
}

/// Per-tier parameters used by full batch runs.
pub fn batch_policy_params(role: TierRole) -> PolicyParams {
    match role {
        TierRole::Retailer => PolicyParams {
            reorder_point: 35,
            order_qty: 30,
            target_stock: 70,
            safety_buffer: 8,
        },
        TierRole::Wholesaler => PolicyParams {
            reorder_point: 50,
            order_qty: 40,
            target_stock: 90,
            safety_buffer: 12,
        },
        TierRole::Factory => PolicyParams {
            reorder_point: 60,
            order_qty: 50,
            target_stock: 110,
            safety_buffer: 16,
        },
    }
}

/// Per-tier parameters used by live sessions. Upstream reorder points sit
/// lower than in batch runs.
pub fn live_policy_params(role: TierRole) -> PolicyParams {
    let batch = batch_policy_params(role);
    match role {
        TierRole::Retailer => batch,
        TierRole::Wholesaler => PolicyParams {
            reorder_point: 45,
            ..batch
        },
        TierRole::Factory => PolicyParams {
            reorder_point: 55,
            ..batch
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_covid_shock() {
        let cfg = ScenarioConfig::default();
        assert_eq!(cfg.demand_pattern, DemandPattern::StepShock);
        assert_eq!(cfg.shock_tick, 15);
        assert_eq!(cfg.shock_magnitude, 2.5);
        assert_eq!(cfg.total_lead_time(), 12);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ScenarioConfig = toml::from_str(
            r#"
            demand_pattern = "SEASONAL"
            factory_lead_time = 9
            "#,
        )
        .unwrap();
        assert_eq!(cfg.demand_pattern, DemandPattern::Seasonal);
        assert_eq!(cfg.factory_lead_time, 9);
        assert_eq!(cfg.retailer_lead_time, 2);
    }

    #[test]
    fn live_toml_overrides_live_defaults() {
        let cfg = LiveConfig::from_toml_str(
            r#"
            retailer_policy = "BASE_STOCK"
            shock_magnitude = 3.0
            speed_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(cfg.retailer_policy, Policy::BaseStock);
        assert_eq!(cfg.wholesaler_policy, Policy::Naive);
        assert_eq!(cfg.scenario.shock_magnitude, 3.0);
        assert_eq!(cfg.scenario.shock_tick, 20);
        assert_eq!(cfg.speed_ms, 50);
    }

    #[test]
    fn unknown_policy_in_toml_is_rejected() {
        let parsed = LiveConfig::from_toml_str(r#"factory_policy = "VMI""#);
        assert!(matches!(parsed, Err(SimError::Toml(_))));

        let typo = LiveConfig::from_toml_str("shock_magnitud = 2.0");
        assert!(typo.is_err());
    }

    #[test]
    fn validate_rejects_bad_magnitude() {
        let mut cfg = ScenarioConfig::default();
        cfg.shock_magnitude = -1.0;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
        cfg.shock_magnitude = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.shock_magnitude = 2.0e8;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
        cfg.shock_magnitude = MAX_SHOCK_MAGNITUDE;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_bounds_lead_times_by_run_length() {
        let mut cfg = ScenarioConfig {
            factory_lead_time: RUN_TICKS,
            ..ScenarioConfig::default()
        };
        assert!(cfg.validate().is_ok());
        cfg.factory_lead_time = usize::MAX;
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn scenario_lookup_by_pattern() {
        assert_eq!(Scenario::for_pattern(DemandPattern::Stochastic), Scenario::NoiseStorm);
        assert_eq!(Scenario::for_pattern(DemandPattern::StepShock), Scenario::CovidShock);
        assert_eq!("noise-storm".parse::<Scenario>().unwrap(), Scenario::NoiseStorm);
        assert!("BLACK_SWAN".parse::<Scenario>().is_err());
    }

    #[test]
    fn live_params_lower_upstream_reorder_points() {
        assert_eq!(live_policy_params(TierRole::Wholesaler).reorder_point, 45);
        assert_eq!(live_policy_params(TierRole::Factory).reorder_point, 55);
        assert_eq!(live_policy_params(TierRole::Factory).target_stock, 110);
    }
}
