// src/io/report.rs

//! Plain-language write-up of a policy comparison.

use chrono::Local;
use serde::Serialize;

use crate::io::demand::{DemandPattern, BASELINE_DEMAND, NOISE_HALF_WIDTH, SEASONAL_AMPLITUDE};
use crate::simulation::config::{Scenario, ScenarioConfig, RUN_TICKS};
use crate::simulation::engine::RunResult;
use crate::strategy::policy::Policy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightReport {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<ReportSection>,
}

impl InsightReport {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n_{}_\n", self.title, self.subtitle);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n{}\n", section.heading, section.body));
        }
        out
    }
}

/// Builds the report from one result per policy. `None` when there is
/// nothing to report on.
pub fn generate_report(
    results: &[RunResult],
    scenario: Scenario,
    config: &ScenarioConfig,
) -> Option<InsightReport> {
    let best = results
        .iter()
        .min_by(|a, b| a.bullwhip.factory.total_cmp(&b.bullwhip.factory))?;
    let worst = results
        .iter()
        .max_by(|a, b| a.bullwhip.factory.total_cmp(&b.bullwhip.factory))?;

    let find = |p: Policy| results.iter().find(|r| r.policy == p);
    let naive = find(Policy::Naive);
    let collab = find(Policy::Collaborative);
    let base_stock = find(Policy::BaseStock);

    let factory_bw = |r: Option<&RunResult>| r.map_or("n/a".to_string(), |r| ratio(r.bullwhip.factory));

    let bw_reduction = match (naive, collab) {
        (Some(n), Some(c)) if n.bullwhip.factory > 0.0 => {
            (n.bullwhip.factory - c.bullwhip.factory) / n.bullwhip.factory * 100.0
        }
        _ => 0.0,
    };
    let stockout_reduction = match (naive, collab) {
        (Some(n), Some(c)) if n.stockouts > 0 => Some(
            (n.stockouts as f64 - c.stockouts as f64) / n.stockouts as f64 * 100.0,
        ),
        _ => None,
    };
    let service_delta = match (naive, collab) {
        (Some(n), Some(c)) => c.service_level - n.service_level,
        _ => 0.0,
    };

    let executive_summary = format!(
        "This simulation analysed a three-tier supply chain (Retailer -> Wholesaler -> Factory) \
         across {count} inventory ordering policies under the {label} demand scenario. \
         {ticks} discrete time steps were run with lead times of {rl}, {wl} and {fl} periods.\n\n\
         Information distortion, not demand volatility itself, is the main driver of \
         instability. The factory bullwhip ratio ranged from {collab_bw} (Collaborative) to \
         {naive_bw} (Naive Reactive): a {bw_reduction:.0}% improvement from sharing the true \
         demand signal upstream, with no change to inventory levels or lead times.",
        count = results.len(),
        label = scenario.label(),
        ticks = RUN_TICKS,
        rl = config.retailer_lead_time,
        wl = config.wholesaler_lead_time,
        fl = config.factory_lead_time,
        collab_bw = factory_bw(collab),
        naive_bw = factory_bw(naive),
    );

    let (naive_peak, overshoot) = naive.map_or((0, 0.0), |n| {
        let peak = n.factory_peak;
        (peak, f64::from(peak) / f64::from(BASELINE_DEMAND) * 100.0 - 100.0)
    });
    let what_happened = format!(
        "Under the {label} scenario, customer demand {demand}. With Naive Reactive ordering \
         this propagated upstream as order amplification: the factory placed peak orders of \
         {naive_peak} units against a baseline demand of {base}, a {overshoot:.0}% overshoot.\n\n\
         Each tier reacts to the orders it sees rather than to real consumption, so \
         oscillations grow as they travel upstream. Lead time is the transmission mechanism: \
         the longer the pipeline, the further ahead each tier must order into a future it \
         cannot observe.",
        label = scenario.label(),
        demand = describe_demand(config),
        base = BASELINE_DEMAND,
    );

    let comparison = format!(
        "{best_label} performed best with a factory bullwhip ratio of {best_bw} and a service \
         level of {best_sl:.1}%. {worst_label} performed worst at {worst_bw}.\n\n\
         Base-Stock reached {base_bw} by counting in-transit goods as part of the inventory \
         position, which stops tiers from ordering the same shortfall twice while a \
         replenishment is still on its way.",
        best_label = best.policy.label(),
        best_bw = ratio(best.bullwhip.factory),
        best_sl = best.service_level,
        worst_label = worst.policy.label(),
        worst_bw = ratio(worst.bullwhip.factory),
        base_bw = factory_bw(base_stock),
    );

    let stockout_line = match stockout_reduction {
        Some(pct) => format!("{pct:.0}% reduction in total stockout units"),
        None => "Minimal change in total stockout units".to_string(),
    };
    let information_value = format!(
        "The gap between the Naive and Collaborative policies isolates the value of demand \
         transparency. Adding only a shared point-of-sale signal gave:\n\n\
         - {bw_reduction:.0}% reduction in factory bullwhip ratio ({naive_bw} -> {collab_bw})\n\
         - {stockout_line}\n\
         - {service_delta:+.1} percentage points of chain-wide service level\n\n\
         Vendor-managed inventory and CPFR programmes are industrial versions of the \
         Collaborative policy.",
        naive_bw = factory_bw(naive),
        collab_bw = factory_bw(collab),
    );

    Some(InsightReport {
        title: "Supply Chain Intelligence Report".to_string(),
        subtitle: format!(
            "Scenario: {} - {}",
            scenario.label(),
            Local::now().format("%-d %B %Y")
        ),
        sections: vec![
            section("Executive Summary", executive_summary),
            section("The Bullwhip Effect: What Happened", what_happened),
            section("Policy Comparison: Key Findings", comparison),
            section("The Quantified Value of Information Sharing", information_value),
        ],
    })
}

fn describe_demand(config: &ScenarioConfig) -> String {
    match config.demand_pattern {
        DemandPattern::StepShock => format!(
            "shifted abruptly at tick {} by a factor of x{}",
            config.shock_tick, config.shock_magnitude
        ),
        DemandPattern::Seasonal => format!(
            "followed a sinusoidal wave with amplitude +/-{SEASONAL_AMPLITUDE} units per period"
        ),
        DemandPattern::Stochastic => format!(
            "fluctuated randomly by up to +/-{NOISE_HALF_WIDTH} units per period"
        ),
        DemandPattern::Stable => format!("remained constant at {BASELINE_DEMAND} units per period"),
    }
}

fn ratio(value: f64) -> String {
    format!("{value:.2}x")
}

fn section(heading: &str, body: String) -> ReportSection {
    ReportSection {
        heading: heading.to_string(),
        body,
    }
}
