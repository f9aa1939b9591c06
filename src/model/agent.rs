// src/model/agent.rs

use serde::{Deserialize, Serialize};

use crate::model::queues::Pipeline;
use crate::strategy::policy::{OrderContext, Policy, PolicyParams};

/// Position in the three-tier chain, most downstream first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierRole {
    Retailer,
    Wholesaler,
    Factory,
}

impl TierRole {
    pub const ALL: [TierRole; 3] = [TierRole::Retailer, TierRole::Wholesaler, TierRole::Factory];

    pub fn tier(self) -> usize {
        match self {
            TierRole::Retailer => 0,
            TierRole::Wholesaler => 1,
            TierRole::Factory => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TierRole::Retailer => "Retailer",
            TierRole::Wholesaler => "Wholesaler",
            TierRole::Factory => "Factory",
        }
    }
}

/// Outcome of serving one tick's demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfilment {
    pub fulfilled: u32,
    pub unfulfilled: u32,
}

/// Read-only view of an agent at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub tier: usize,
    pub inventory: u32,
    pub backlog: u32,
    pub last_order_placed: u32,
    pub last_demand: u32,
    pub in_transit: u32,
}

impl AgentSnapshot {
    pub fn inventory_position(&self) -> i64 {
        i64::from(self.inventory) + i64::from(self.in_transit) - i64::from(self.backlog)
    }
}

/// The state of a single node in the supply chain.
///
/// State only changes through [`fulfil`](Self::fulfil),
/// [`decide_order`](Self::decide_order) and
/// [`advance_pipeline`](Self::advance_pipeline). `Clone` is a deep copy,
/// pipeline included.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    // Identity
    role: TierRole,
    policy: Policy,
    params: PolicyParams,

    // State Variables
    inventory: u32,
    backlog: u32,
    last_demand: u32,
    last_order_placed: u32,
    pipeline: Pipeline,

    // Running totals for averages
    total_stockouts: u64,
    total_held: u64,
    ticks: u64,
    total_fulfilled: u64,
    total_demand: u64,
}

impl Agent {
    pub fn new(
        role: TierRole,
        lead_time: usize,
        initial_inventory: u32,
        policy: Policy,
        params: PolicyParams,
    ) -> Self {
        Self {
            role,
            policy,
            params,
            inventory: initial_inventory,
            backlog: 0,
            last_demand: 0,
            last_order_placed: 0,
            pipeline: Pipeline::new(lead_time),
            total_stockouts: 0,
            total_held: 0,
            ticks: 0,
            total_fulfilled: 0,
            total_demand: 0,
        }
    }

    /// Serve `demand` plus any carried backlog from on-hand stock.
    ///
    /// Stock never goes negative; whatever can't be shipped becomes the new
    /// backlog and is counted as stockout units.
    pub fn fulfil(&mut self, demand: u32) -> Fulfilment {
        let obligation = demand.saturating_add(self.backlog);
        let fulfilled = self.inventory.min(obligation);
        let unfulfilled = obligation - fulfilled;

        if unfulfilled > 0 {
            self.total_stockouts += u64::from(unfulfilled);
        }

        self.inventory -= fulfilled;
        self.backlog = unfulfilled;
        self.last_demand = demand;
        self.total_fulfilled += u64::from(fulfilled);
        self.total_demand += u64::from(demand);

        Fulfilment {
            fulfilled,
            unfulfilled,
        }
    }

    /// Run the policy and remember the result as this tick's order.
    ///
    /// `shared_signal` replaces the locally observed demand when the whole
    /// chain is collaborating.
    pub fn decide_order(&mut self, shared_signal: Option<u32>) -> u32 {
        let context = self.order_context(shared_signal);
        let raw = self.policy.compute(&context, &self.params);

        self.last_order_placed = u32::try_from(raw.max(0)).unwrap_or(u32::MAX);
        self.last_order_placed
    }

    /// Send `order` into transit and take delivery of whatever arrives now.
    pub fn advance_pipeline(&mut self, order: u32) -> u32 {
        let arrival = self.pipeline.advance(order);
        self.inventory = self.inventory.saturating_add(arrival);
        self.total_held += u64::from(self.inventory);
        self.ticks += 1;
        arrival
    }

    pub fn order_context(&self, shared_signal: Option<u32>) -> OrderContext {
        OrderContext {
            inventory: self.inventory,
            backlog: self.backlog,
            last_demand: self.last_demand,
            in_transit: self.pipeline.in_transit(),
            demand_signal: shared_signal.unwrap_or(self.last_demand),
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            name: self.role.name().to_string(),
            tier: self.role.tier(),
            inventory: self.inventory,
            backlog: self.backlog,
            last_order_placed: self.last_order_placed,
            last_demand: self.last_demand,
            in_transit: self.pipeline.in_transit(),
        }
    }

    /// Mean end-of-tick inventory; the current level before the first tick.
    pub fn avg_inventory(&self) -> f64 {
        if self.ticks > 0 {
            self.total_held as f64 / self.ticks as f64
        } else {
            f64::from(self.inventory)
        }
    }

    /// Percentage of demand served on the tick it arrived; 100 before any demand.
    pub fn service_level(&self) -> f64 {
        if self.total_demand > 0 {
            self.total_fulfilled as f64 / self.total_demand as f64 * 100.0
        } else {
            100.0
        }
    }

    pub fn role(&self) -> TierRole {
        self.role
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn params(&self) -> &PolicyParams {
        &self.params
    }

    pub fn inventory(&self) -> u32 {
        self.inventory
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    pub fn last_demand(&self) -> u32 {
        self.last_demand
    }

    pub fn last_order_placed(&self) -> u32 {
        self.last_order_placed
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn total_stockouts(&self) -> u64 {
        self.total_stockouts
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
