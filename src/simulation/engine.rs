// src/simulation/engine.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::io::demand::generate_demand;
use crate::model::agent::{Agent, AgentSnapshot, TierRole};
use crate::simulation::config::{
    batch_policy_params, live_policy_params, LiveConfig, ScenarioConfig, INITIAL_INVENTORY,
    RUN_TICKS,
};
use crate::simulation::metrics::{
    average_inventory, compute_bullwhip, factory_peak, round_to, BullwhipRatios,
};
use crate::strategy::policy::Policy;

/// One row of the per-tick log. Every metric is derived from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub tick: usize,
    pub customer_demand: u32,
    pub retailer: AgentSnapshot,
    pub wholesaler: AgentSnapshot,
    pub factory: AgentSnapshot,
}

impl HistoryRecord {
    pub fn tier(&self, role: TierRole) -> &AgentSnapshot {
        match role {
            TierRole::Retailer => &self.retailer,
            TierRole::Wholesaler => &self.wholesaler,
            TierRole::Factory => &self.factory,
        }
    }

    /// Retailer, wholesaler, factory.
    pub fn tiers(&self) -> [&AgentSnapshot; 3] {
        [&self.retailer, &self.wholesaler, &self.factory]
    }
}

/// Outcome of a complete 100-tick run with one policy on every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub policy: Policy,
    pub history: Vec<HistoryRecord>,
    pub bullwhip: BullwhipRatios,
    /// Mean on-hand inventory across tiers and ticks, one decimal.
    pub avg_inv: f64,
    /// Stockout units summed over all tiers.
    pub stockouts: u64,
    /// Mean of the three tiers' service levels, one decimal.
    pub service_level: f64,
    pub factory_peak: u32,
}

/// Retailer, wholesaler and factory, in that order.
///
/// A chain is an owned value: `clone` gives a fully independent copy, which
/// is how ticks are staged before being committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    agents: [Agent; 3],
}

impl Chain {
    /// Agents must be ordered retailer, wholesaler, factory.
    pub fn new(agents: [Agent; 3]) -> Self {
        debug_assert!(agents
            .iter()
            .zip(TierRole::ALL)
            .all(|(agent, role)| agent.role() == role));
        Self { agents }
    }

    /// Fresh chain for a batch run: `policy` everywhere, batch parameters.
    pub fn for_batch(policy: Policy, config: &ScenarioConfig) -> Self {
        Self::new(TierRole::ALL.map(|role| {
            Agent::new(
                role,
                config.lead_time(role),
                INITIAL_INVENTORY,
                policy,
                batch_policy_params(role),
            )
        }))
    }

    /// Fresh chain for an interactive session.
    pub fn for_live(config: &LiveConfig) -> Self {
        Self::new(TierRole::ALL.map(|role| {
            Agent::new(
                role,
                config.scenario.lead_time(role),
                config.initial_inventory,
                config.policy(role),
                live_policy_params(role),
            )
        }))
    }

    pub fn agent(&self, role: TierRole) -> &Agent {
        &self.agents[role.tier()]
    }

    pub fn agents(&self) -> &[Agent; 3] {
        &self.agents
    }

    pub fn retailer(&self) -> &Agent {
        self.agent(TierRole::Retailer)
    }

    pub fn wholesaler(&self) -> &Agent {
        self.agent(TierRole::Wholesaler)
    }

    pub fn factory(&self) -> &Agent {
        self.agent(TierRole::Factory)
    }

    /// True customer demand is only shared when every tier collaborates.
    pub fn shares_demand_signal(&self) -> bool {
        self.agents
            .iter()
            .all(|a| a.policy() == Policy::Collaborative)
    }

    /// Replace this chain's state with a staged copy that has finished a tick.
    pub fn commit(&mut self, staged: Chain) {
        *self = staged;
    }

    pub fn total_stockouts(&self) -> u64 {
        self.agents.iter().map(Agent::total_stockouts).sum()
    }

    pub fn mean_service_level(&self) -> f64 {
        self.agents.iter().map(Agent::service_level).sum::<f64>() / 3.0
    }
}

/// Advance `chain` by one tick using the configured demand pattern.
pub fn tick_sim(chain: &mut Chain, tick: usize, config: &ScenarioConfig) -> HistoryRecord {
    let demand = generate_demand(
        tick,
        config.demand_pattern,
        config.shock_tick,
        config.shock_magnitude,
    );
    tick_sim_with_demand(chain, tick, demand)
}

/// Advance `chain` by one tick against an externally supplied demand.
///
/// Upstream tiers see the order their downstream neighbour placed on the
/// *previous* tick: fulfilment runs before anyone decides this tick's order.
pub fn tick_sim_with_demand(chain: &mut Chain, tick: usize, demand: u32) -> HistoryRecord {
    let shared = chain.shares_demand_signal().then_some(demand);
    let [retailer, wholesaler, factory] = &mut chain.agents;

    // =================================================================
    // PHASE 1: FULFILMENT
    // Each tier serves demand plus backlog from on-hand stock.
    // =================================================================
    retailer.fulfil(demand);
    wholesaler.fulfil(retailer.last_order_placed());
    factory.fulfil(wholesaler.last_order_placed());

    // =================================================================
    // PHASE 2: DECISIONS
    // =================================================================
    let r_order = retailer.decide_order(shared);
    let w_order = wholesaler.decide_order(shared);
    let f_order = factory.decide_order(shared);

    // =================================================================
    // PHASE 3: TRANSIT
    // New orders enter the pipe; this tick's arrivals land in stock.
    // =================================================================
    retailer.advance_pipeline(r_order);
    wholesaler.advance_pipeline(w_order);
    factory.advance_pipeline(f_order);

    HistoryRecord {
        tick,
        customer_demand: demand,
        retailer: retailer.snapshot(),
        wholesaler: wholesaler.snapshot(),
        factory: factory.snapshot(),
    }
}

/// Run a fresh chain with `policy` on every tier for exactly 100 ticks.
pub fn run_full_sim(policy: Policy, config: &ScenarioConfig) -> RunResult {
    let mut chain = Chain::for_batch(policy, config);
    let mut history = Vec::with_capacity(RUN_TICKS);

    for tick in 1..=RUN_TICKS {
        // Stage the tick on a copy; the live chain only changes on commit.
        let mut staged = chain.clone();
        let record = tick_sim(&mut staged, tick, config);

        if tick % 10 == 0 {
            debug!(
                tick,
                policy = %policy,
                demand = record.customer_demand,
                retailer_inv = record.retailer.inventory,
                factory_order = record.factory.last_order_placed,
                "tick"
            );
        }

        history.push(record);
        chain.commit(staged);
    }

    let result = RunResult {
        policy,
        bullwhip: compute_bullwhip(&history),
        avg_inv: round_to(average_inventory(&history), 1),
        stockouts: chain.total_stockouts(),
        service_level: round_to(chain.mean_service_level(), 1),
        factory_peak: factory_peak(&history),
        history,
    };

    info!(
        policy = %policy,
        pattern = %config.demand_pattern,
        factory_bullwhip = result.bullwhip.factory,
        service_level = result.service_level,
        "run complete"
    );
    result
}
