//! Live sessions driven tick by tick, plus the TOML files that configure them.

use bullwhip_sim::io::run_store::RunStore;
use bullwhip_sim::simulation::config::live_policy_params;
use bullwhip_sim::{
    run_full_sim, DemandPattern, LiveConfig, LiveSession, Policy, Scenario, ScenarioConfig,
    SimError, TierRole,
};

fn drive_to_end(session: &mut LiveSession) {
    session.resume();
    while session.on_timer().is_some() {}
}

#[test]
fn default_session_uses_live_parameters() {
    let session = LiveSession::new(LiveConfig::default());
    let chain = session.chain();

    assert_eq!(chain.wholesaler().params().reorder_point, 45);
    assert_eq!(chain.factory().params().reorder_point, 55);
    assert_eq!(*chain.retailer().params(), live_policy_params(TierRole::Retailer));
    for agent in chain.agents() {
        assert_eq!(agent.inventory(), 60);
        assert_eq!(agent.policy(), Policy::Naive);
    }
}

#[test]
fn shock_flag_follows_tick() {
    let mut session = LiveSession::new(LiveConfig::default());
    for _ in 0..19 {
        session.step();
    }
    assert!(!session.shock_active());

    let record = session.step().cloned().unwrap();
    assert!(session.shock_active());
    assert_eq!(record.tick, 20);
    assert_eq!(record.customer_demand, 44);
}

#[test]
fn history_tracks_every_tick() {
    let mut session = LiveSession::new(LiveConfig::default());
    for expected in 1..=30 {
        session.step();
        assert_eq!(session.history().len(), expected);
        assert_eq!(session.latest().map(|h| h.tick), Some(expected));
    }
}

#[test]
fn bullwhip_reported_after_five_ticks() {
    let mut session = LiveSession::new(LiveConfig::default());
    for _ in 0..4 {
        session.step();
    }
    assert_eq!(session.bullwhip(), Default::default());

    for _ in 0..6 {
        session.step();
    }
    // Demand is still flat; the factory's startup ramp is pure amplification.
    assert!(session.bullwhip().factory > 1.0);
    assert_eq!(session.bullwhip().retailer, 0.0);
}

#[test]
fn uniform_live_session_matches_batch_run_with_same_parameters() {
    // Batch runs use higher upstream reorder points, which only FIXED_REORDER reads.
    let scenario = Scenario::CovidShock.config();
    let config = LiveConfig {
        retailer_policy: Policy::BaseStock,
        wholesaler_policy: Policy::BaseStock,
        factory_policy: Policy::BaseStock,
        scenario: scenario.clone(),
        ..LiveConfig::default()
    };
    let mut session = LiveSession::new(config);
    drive_to_end(&mut session);

    let batch = run_full_sim(Policy::BaseStock, &scenario);
    assert_eq!(session.history(), batch.history.as_slice());
    assert_eq!(session.bullwhip(), batch.bullwhip);
}

#[test]
fn reset_keeps_config() {
    let config = LiveConfig {
        factory_policy: Policy::Collaborative,
        ..LiveConfig::default()
    };
    let mut session = LiveSession::new(config.clone());
    drive_to_end(&mut session);
    assert!(session.is_complete());

    session.reset();
    assert_eq!(session.tick(), 0);
    assert!(!session.is_complete());
    assert!(session.history().is_empty());
    assert_eq!(session.config(), &config);
}

#[test]
fn completed_session_summary_round_trips_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::new(dir.path());

    let mut session = LiveSession::new(LiveConfig {
        wholesaler_policy: Policy::FixedReorder,
        ..LiveConfig::default()
    });
    drive_to_end(&mut session);

    let summary = session.summary().unwrap();
    assert_eq!(summary.stockouts, session.chain().total_stockouts());
    assert_eq!(summary.factory_bw, session.bullwhip().factory);
    assert_eq!(
        summary.policies,
        [Policy::Naive, Policy::FixedReorder, Policy::Naive]
    );

    store.save(&summary).unwrap();
    assert_eq!(store.list().unwrap(), vec![summary]);
}

// =============================================================================
// Configuration files
// =============================================================================

#[test]
fn live_toml_overrides_only_given_keys() {
    let config = LiveConfig::from_toml_str(
        r#"
        factory_policy = "BASE_STOCK"
        factory_lead_time = 6
        speed_ms = 50
        "#,
    )
    .unwrap();

    assert_eq!(config.factory_policy, Policy::BaseStock);
    assert_eq!(config.retailer_policy, Policy::Naive);
    assert_eq!(config.scenario.factory_lead_time, 6);
    assert_eq!(config.scenario.shock_tick, 20);
    assert_eq!(config.scenario.shock_magnitude, 2.2);
    assert_eq!(config.speed_ms, 50);
}

#[test]
fn live_toml_rejects_bad_values() {
    assert!(matches!(
        LiveConfig::from_toml_str("retailer_policy = \"PANIC_BUY\""),
        Err(SimError::Toml(_))
    ));
    assert!(matches!(
        LiveConfig::from_toml_str("shock_magnitude = 0.0"),
        Err(SimError::InvalidConfig(_))
    ));
    assert!(matches!(
        LiveConfig::from_toml_str("speed_ms = 0"),
        Err(SimError::InvalidConfig(_))
    ));
}

#[test]
fn scenario_file_fills_missing_keys_from_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.toml");
    std::fs::write(
        &path,
        "demand_pattern = \"SEASONAL\"\nretailer_lead_time = 1\n",
    )
    .unwrap();

    let config = ScenarioConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.demand_pattern, DemandPattern::Seasonal);
    assert_eq!(config.retailer_lead_time, 1);
    assert_eq!(config.factory_lead_time, 6);
    assert_eq!(Scenario::for_pattern(config.demand_pattern), Scenario::Seasonal);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        LiveConfig::from_toml_file(dir.path().join("absent.toml")),
        Err(SimError::Io(_))
    ));
}
