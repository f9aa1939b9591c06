// src/io/run_store.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SimError};
use crate::simulation::config::{Scenario, ScenarioConfig};
use crate::simulation::engine::RunResult;
use crate::strategy::policy::Policy;

const FILE_PREFIX: &str = "run-";
const FILE_EXT: &str = "json";

/// Headline numbers of a finished run, small enough to keep around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub scenario: Scenario,
    /// Retailer, wholesaler, factory.
    pub policies: [Policy; 3],
    pub factory_bw: f64,
    pub stockouts: u64,
    pub service_level: f64,
    pub shock_tick: usize,
    pub shock_magnitude: f64,
}

impl RunSummary {
    pub fn new(
        scenario: Scenario,
        policies: [Policy; 3],
        factory_bw: f64,
        stockouts: u64,
        service_level: f64,
        shock_tick: usize,
        shock_magnitude: f64,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: timestamp.format("%Y%m%d%H%M%S%f").to_string(),
            timestamp,
            scenario,
            policies,
            factory_bw,
            stockouts,
            service_level,
            shock_tick,
            shock_magnitude,
        }
    }

    /// Summary of a uniform-policy batch run.
    pub fn from_result(result: &RunResult, config: &ScenarioConfig) -> Self {
        Self::new(
            Scenario::for_pattern(config.demand_pattern),
            [result.policy; 3],
            result.bullwhip.factory,
            result.stockouts,
            result.service_level,
            config.shock_tick,
            config.shock_magnitude,
        )
    }
}

/// Saved runs, one JSON file each, in a single directory.
#[derive(Debug, Clone)]
pub struct RunStore {
    dir: PathBuf,
}

impl RunStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.path_for(&summary.id)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_vec_pretty(summary)?)?;

        info!(id = %summary.id, path = %path.display(), "saved run");
        Ok(path)
    }

    /// Newest first. Unreadable files are skipped, not fatal.
    pub fn list(&self) -> Result<Vec<RunSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut runs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !is_run_file(&path) {
                continue;
            }
            match fs::read(&path)
                .map_err(SimError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<RunSummary>(&bytes)?))
            {
                Ok(run) => runs.push(run),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping saved run"),
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(id)?) {
            Ok(()) => {
                info!(id, "deleted run");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SimError::RunNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    // Ids become file names, so nothing that could leave the directory.
    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SimError::InvalidRunId(id.to_string()));
        }
        Ok(self.dir.join(format!("{FILE_PREFIX}{id}.{FILE_EXT}")))
    }
}

fn is_run_file(path: &Path) -> bool {
    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX));
    named && path.extension().is_some_and(|ext| ext == FILE_EXT)
}
