pub mod demand;
pub mod report;
pub mod reporting;
pub mod run_store;
