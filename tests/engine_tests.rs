//! End-to-end runs of the three-tier chain.
//!
//! The regression figures below come from complete 100-tick runs of the
//! preset scenarios and pin down tick ordering, pipeline timing and the
//! metric rounding together.

use bullwhip_sim::io::demand::generate_schedule;
use bullwhip_sim::{
    compute_bullwhip, run_full_sim, tick_sim, BullwhipRatios, Chain, DemandPattern, Policy,
    Scenario, ScenarioConfig, SimError, TierRole,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn assert_ratios(actual: BullwhipRatios, expected: [f64; 3]) {
    assert_close(actual.retailer, expected[0]);
    assert_close(actual.wholesaler, expected[1]);
    assert_close(actual.factory, expected[2]);
}

// =============================================================================
// COVID shock regression
// =============================================================================

#[test]
fn covid_naive_regression() {
    let result = run_full_sim(Policy::Naive, &Scenario::CovidShock.config());

    assert_ratios(result.bullwhip, [1.0, 1.1, 1.2]);
    assert_close(result.avg_inv, 44.5);
    assert_eq!(result.stockouts, 48410);
    assert_close(result.service_level, 95.8);
    assert_eq!(result.factory_peak, 50);
}

#[test]
fn covid_fixed_reorder_regression() {
    let result = run_full_sim(Policy::FixedReorder, &Scenario::CovidShock.config());

    assert_ratios(result.bullwhip, [1.01, 2.68, 3.74]);
    assert_close(result.avg_inv, 56.3);
    assert_eq!(result.stockouts, 86670);
    assert_close(result.service_level, 86.7);
    assert_eq!(result.factory_peak, 50);
}

#[test]
fn covid_base_stock_regression() {
    let result = run_full_sim(Policy::BaseStock, &Scenario::CovidShock.config());

    assert_ratios(result.bullwhip, [0.98, 0.99, 0.99]);
    assert_close(result.avg_inv, 45.0);
    assert_eq!(result.stockouts, 40270);
    assert_close(result.service_level, 96.5);
    assert_eq!(result.factory_peak, 50);
}

#[test]
fn covid_collaborative_regression() {
    let result = run_full_sim(Policy::Collaborative, &Scenario::CovidShock.config());

    assert_ratios(result.bullwhip, [1.14, 1.29, 1.41]);
    assert_close(result.avg_inv, 45.4);
    assert_eq!(result.stockouts, 49170);
    assert_close(result.service_level, 95.8);
    assert_eq!(result.factory_peak, 80);
}

#[test]
fn base_stock_damps_fixed_reorder_amplification() {
    let config = Scenario::CovidShock.config();
    let fixed = run_full_sim(Policy::FixedReorder, &config);
    let base = run_full_sim(Policy::BaseStock, &config);

    assert!(fixed.bullwhip.factory > fixed.bullwhip.wholesaler);
    assert!(fixed.bullwhip.wholesaler > fixed.bullwhip.retailer);
    assert!(base.bullwhip.factory < fixed.bullwhip.factory);
    assert!(base.service_level > fixed.service_level);
}

// =============================================================================
// Stable demand
// =============================================================================

#[test]
fn naive_orders_propagate_one_tier_per_tick() {
    let result = run_full_sim(Policy::Naive, &Scenario::Stable.config());
    let orders: Vec<[u32; 3]> = result
        .history
        .iter()
        .map(|h| h.tiers().map(|t| t.last_order_placed))
        .collect();

    assert_eq!(orders[0], [20, 0, 0]);
    assert_eq!(orders[1], [20, 20, 0]);
    assert!(orders[2..].iter().all(|o| *o == [20, 20, 20]));
}

#[test]
fn flat_demand_uses_cov_floor() {
    let result = run_full_sim(Policy::Naive, &Scenario::Stable.config());

    // The startup ramp is the only order variance upstream.
    assert_ratios(result.bullwhip, [0.0, 100.5, 142.86]);
}

#[test]
fn base_stock_holds_inventory_position_at_target() {
    let result = run_full_sim(Policy::BaseStock, &Scenario::Stable.config());

    for record in &result.history {
        let positions = record.tiers().map(|t| t.inventory_position());
        assert_eq!(positions, [70, 90, 110], "tick {}", record.tick);
    }
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn every_run_records_one_hundred_ticks() {
    for scenario in Scenario::ALL {
        for policy in Policy::ALL {
            let result = run_full_sim(policy, &scenario.config());
            assert_eq!(result.history.len(), 100);
            assert_eq!(result.policy, policy);

            let ticks: Vec<usize> = result.history.iter().map(|h| h.tick).collect();
            assert_eq!(ticks, (1..=100).collect::<Vec<_>>());
        }
    }
}

#[test]
fn deterministic_patterns_repeat_exactly() {
    for scenario in [Scenario::CovidShock, Scenario::Seasonal, Scenario::Stable] {
        let config = scenario.config();
        assert!(config.demand_pattern.is_deterministic());
        for policy in Policy::ALL {
            assert_eq!(run_full_sim(policy, &config), run_full_sim(policy, &config));
        }
    }
}

#[test]
fn noise_storm_demand_stays_in_band() {
    let result = run_full_sim(Policy::Naive, &Scenario::NoiseStorm.config());
    assert!(result
        .history
        .iter()
        .all(|h| (11..=29).contains(&h.customer_demand)));
}

#[test]
fn history_demand_matches_generated_schedule() {
    let config = Scenario::Seasonal.config();
    let result = run_full_sim(Policy::BaseStock, &config);
    let schedule = generate_schedule(
        100,
        config.demand_pattern,
        config.shock_tick,
        config.shock_magnitude,
    );

    let recorded: Vec<u32> = result.history.iter().map(|h| h.customer_demand).collect();
    assert_eq!(recorded, schedule);
    assert_eq!(
        [schedule[0], schedule[1], schedule[12], schedule[25], schedule[38], schedule[51]],
        [21, 23, 32, 20, 8, 20]
    );
}

#[test]
fn bullwhip_defaults_below_five_records() {
    let config = Scenario::CovidShock.config();
    let mut chain = Chain::for_batch(Policy::FixedReorder, &config);
    let history: Vec<_> = (1..=4).map(|t| tick_sim(&mut chain, t, &config)).collect();

    assert_eq!(compute_bullwhip(&history), BullwhipRatios::default());
    assert_eq!(compute_bullwhip(&[]), BullwhipRatios::default());
}

#[test]
fn oversized_shock_is_rejected_but_still_runs() {
    let config = Scenario::CovidShock.config().with_step_shock(15, 2.0e8);
    assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

    // The engine stays total even when handed an unvalidated config.
    for policy in Policy::ALL {
        let result = run_full_sim(policy, &config);
        assert_eq!(result.history.len(), 100);
        for record in &result.history {
            for tier in record.tiers() {
                assert!(tier.in_transit >= tier.last_order_placed);
            }
        }
    }
}

#[test]
fn zero_lead_times_behave_as_one() {
    let zero = ScenarioConfig {
        demand_pattern: DemandPattern::Stable,
        retailer_lead_time: 0,
        wholesaler_lead_time: 0,
        factory_lead_time: 0,
        ..Scenario::Stable.config()
    };
    let one = ScenarioConfig {
        retailer_lead_time: 1,
        wholesaler_lead_time: 1,
        factory_lead_time: 1,
        ..zero.clone()
    };

    let a = run_full_sim(Policy::Naive, &zero);
    let b = run_full_sim(Policy::Naive, &one);
    assert_eq!(a.history, b.history);

    let chain = Chain::for_batch(Policy::Naive, &zero);
    for role in TierRole::ALL {
        assert_eq!(chain.agent(role).pipeline().len(), 1);
    }
}
