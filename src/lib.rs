//! Three-tier supply chain simulator for measuring the bullwhip effect.
//!
//! A retailer, wholesaler and factory each hold stock, serve the tier below,
//! and order from the tier above through a fixed-delay pipeline. The engine
//! advances the chain one tick at a time and records every tick, and the
//! metrics module turns that history into bullwhip ratios and service levels.
//!
//! ```no_run
//! use bullwhip_sim::{run_full_sim, Policy, Scenario};
//!
//! let result = run_full_sim(Policy::BaseStock, &Scenario::CovidShock.config());
//! println!("factory bullwhip: {:.2}", result.bullwhip.factory);
//! ```

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{Result, SimError};
pub use io::demand::{generate_demand, DemandPattern};
pub use model::agent::{Agent, AgentSnapshot, TierRole};
pub use model::queues::Pipeline;
pub use simulation::config::{LiveConfig, Scenario, ScenarioConfig};
pub use simulation::engine::{run_full_sim, tick_sim, tick_sim_with_demand, Chain, HistoryRecord, RunResult};
pub use simulation::metrics::{compute_bullwhip, BullwhipRatios};
pub use simulation::session::LiveSession;
pub use strategy::policy::{Policy, PolicyParams};
