// src/io/reporting.rs

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::simulation::engine::HistoryRecord;

/// One exported row. Field order is the column order, and external
/// consumers depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub tick: usize,
    pub demand: u32,
    pub ret_inv: u32,
    pub who_inv: u32,
    pub fac_inv: u32,
    pub ret_order: u32,
    pub who_order: u32,
    pub fac_order: u32,
}

impl From<&HistoryRecord> for ExportRow {
    fn from(h: &HistoryRecord) -> Self {
        Self {
            tick: h.tick,
            demand: h.customer_demand,
            ret_inv: h.retailer.inventory,
            who_inv: h.wholesaler.inventory,
            fac_inv: h.factory.inventory,
            ret_order: h.retailer.last_order_placed,
            who_order: h.wholesaler.last_order_placed,
            fac_order: h.factory.last_order_placed,
        }
    }
}

/// Writes the per-tick table, header first, to any writer.
pub fn write_history<W: Write>(writer: W, data: &[HistoryRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in data {
        wtr.serialize(ExportRow::from(record))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the simulation history to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/run_1.csv").
/// * `data` - The history records from the simulation engine.
pub fn write_simulation_log(file_path: impl AsRef<Path>, data: &[HistoryRecord]) -> Result<()> {
    let path = file_path.as_ref();
    let file = std::fs::File::create(path)?;
    write_history(file, data)?;

    info!(rows = data.len(), path = %path.display(), "exported history");
    Ok(())
}

/// The same table as a string.
pub fn history_to_csv(data: &[HistoryRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_history(&mut buf, data)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
