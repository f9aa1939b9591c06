// src/simulation/session.rs

use tracing::{debug, info};

use crate::io::run_store::RunSummary;
use crate::simulation::config::{LiveConfig, Scenario, RUN_TICKS};
use crate::simulation::engine::{tick_sim, Chain, HistoryRecord};
use crate::simulation::metrics::{compute_bullwhip, round_to, BullwhipRatios};

/// An interactive, tick-at-a-time simulation.
///
/// The driver (a timer, a UI loop, a test) calls [`step`](Self::step); the
/// session only advances while running and stops by itself at tick 100, so
/// the history never holds more than `RUN_TICKS` records.
/// Pausing between ticks is the only form of cancellation.
#[derive(Debug, Clone)]
pub struct LiveSession {
    config: LiveConfig,
    chain: Chain,
    history: Vec<HistoryRecord>,
    tick: usize,
    running: bool,
    bullwhip: BullwhipRatios,
}

impl LiveSession {
    pub fn new(config: LiveConfig) -> Self {
        let chain = Chain::for_live(&config);
        Self {
            config,
            chain,
            history: Vec::new(),
            tick: 0,
            running: false,
            bullwhip: BullwhipRatios::default(),
        }
    }

    /// Run one tick regardless of the running flag. Returns `None` once the
    /// session is complete.
    pub fn step(&mut self) -> Option<&HistoryRecord> {
        if self.is_complete() {
            self.running = false;
            return None;
        }

        let next = self.tick + 1;
        let mut staged = self.chain.clone();
        let record = tick_sim(&mut staged, next, &self.config.scenario);

        self.history.push(record);
        self.chain.commit(staged);
        self.tick = next;
        self.bullwhip = compute_bullwhip(&self.history);

        debug!(tick = next, factory_bullwhip = self.bullwhip.factory, "live tick");

        if self.is_complete() {
            self.running = false;
            info!(ticks = self.tick, "live session complete");
        }
        self.history.last()
    }

    /// Tick only if running. This is what a timer callback should call.
    pub fn on_timer(&mut self) -> Option<&HistoryRecord> {
        if self.running {
            self.step()
        } else {
            None
        }
    }

    pub fn resume(&mut self) {
        self.running = !self.is_complete();
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Discard the chain and history and start over with the same config.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Any configuration change rebuilds the chain from scratch.
    pub fn update_config(&mut self, config: LiveConfig) {
        *self = Self::new(config);
    }

    pub fn is_complete(&self) -> bool {
        self.tick >= RUN_TICKS
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn shock_active(&self) -> bool {
        self.tick >= self.config.scenario.shock_tick
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.history.last()
    }

    pub fn bullwhip(&self) -> BullwhipRatios {
        self.bullwhip
    }

    /// Summary worth saving, available once the session has finished.
    pub fn summary(&self) -> Option<RunSummary> {
        if !self.is_complete() {
            return None;
        }
        let scenario = &self.config.scenario;
        Some(RunSummary::new(
            Scenario::for_pattern(scenario.demand_pattern),
            self.config.policies(),
            self.bullwhip.factory,
            self.chain.total_stockouts(),
            round_to(self.chain.mean_service_level(), 1),
            scenario.shock_tick,
            scenario.shock_magnitude,
        ))
    }
}
