// src/strategy/policy.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Everything a policy is allowed to look at when deciding an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderContext {
    /// Current on-hand stock.
    pub inventory: u32,
    /// Current unfilled obligations.
    pub backlog: u32,
    /// Demand this agent observed on its most recent fulfilment.
    pub last_demand: u32,
    /// Goods ordered but not yet arrived.
    pub in_transit: u32,
    /// Demand the policy should plan against: the true customer demand when
    /// the chain shares it, otherwise `last_demand`.
    pub demand_signal: u32,
}

impl OrderContext {
    /// On-hand + in-transit - backlog. May be negative under heavy backlog.
    pub fn inventory_position(&self) -> i64 {
        i64::from(self.inventory) + i64::from(self.in_transit) - i64::from(self.backlog)
    }
}

/// Per-agent tuning knobs. Each policy reads only the fields it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    pub reorder_point: u32,
    pub order_qty: u32,
    pub target_stock: u32,
    pub safety_buffer: u32,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            reorder_point: 40,
            order_qty: 30,
            target_stock: 80,
            safety_buffer: 10,
        }
    }
}

/// The four ordering strategies. A closed set: dispatch is a `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Policy {
    /// Order exactly what was last demanded.
    Naive,
    /// (s, Q): order a fixed batch when stock falls below the reorder point.
    FixedReorder,
    /// Order up to a target inventory position, counting the pipeline.
    BaseStock,
    /// Base-stock around the shared customer demand plus a safety buffer.
    Collaborative,
}

impl Policy {
    pub const ALL: [Policy; 4] = [
        Policy::Naive,
        Policy::FixedReorder,
        Policy::BaseStock,
        Policy::Collaborative,
    ];

    /// Raw order quantity. Callers round and floor at zero.
    pub fn compute(self, ctx: &OrderContext, params: &PolicyParams) -> i64 {
        match self {
            Policy::Naive => i64::from(ctx.last_demand),
            Policy::FixedReorder => {
                if ctx.inventory < params.reorder_point {
                    i64::from(params.order_qty)
                } else {
                    0
                }
            }
            Policy::BaseStock => {
                let gap = i64::from(params.target_stock) - ctx.inventory_position();
                gap.max(0)
            }
            Policy::Collaborative => {
                let target = i64::from(ctx.demand_signal) + i64::from(params.safety_buffer);
                (target - ctx.inventory_position()).max(0)
            }
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Policy::Naive => "NAIVE",
            Policy::FixedReorder => "FIXED_REORDER",
            Policy::BaseStock => "BASE_STOCK",
            Policy::Collaborative => "COLLABORATIVE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Policy::Naive => "Naive Reactive",
            Policy::FixedReorder => "Fixed Reorder Point",
            Policy::BaseStock => "Base-Stock",
            Policy::Collaborative => "Collaborative",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Policy::Naive => "NAIVE",
            Policy::FixedReorder => "FIXED-ROP",
            Policy::BaseStock => "BASE-STK",
            Policy::Collaborative => "COLLAB",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Policy::Naive => "Order exactly what was sold last period; pure reaction, no foresight.",
            Policy::FixedReorder => "Order batch Q when on-hand stock drops below threshold S.",
            Policy::BaseStock => {
                "Target position T; order the gap between T and (inventory + pipeline - backlog)."
            }
            Policy::Collaborative => {
                "All tiers share the true customer demand signal, removing information distortion."
            }
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Policy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Policy::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| SimError::UnknownPolicy(s.to_string()))
    }
}
