pub mod analysis;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod session;
