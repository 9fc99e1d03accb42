//! Per-iteration scalars from the optimization log (`bayes_log.csv`).
//!
//! One row per evaluated iteration. Missing cells read as the sentinel `-1`,
//! and every row counts toward the iteration count, sentinel or not.

use crate::config::ReaderConfig;
use crate::error::IngestError;
use crate::fetch::RUN_LOG;
use crate::logging::{log, obj, Domain, Level};
use crate::names::provenance_name;
use crate::table::{parse_number, Table};
use crate::whiteboard::{Value, Whiteboard};

pub const MISSING_SENTINEL: f64 = -1.0;

/// Raw run-log column → canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogColumns {
    pub mapping: Vec<(String, String)>,
}

impl RunLogColumns {
    /// The inventory indices name which solar array and battery the
    /// optimizer sized; they vary with the design's inventory layout.
    pub fn with_indices(solar_index: u32, battery_index: u32) -> Self {
        let inv = "inventory.inventory";
        let mapping = vec![
            (format!("{}.solar{}.properties.size.pv_kw", inv, solar_index), "PvMaxPPa"),
            ("re_percent".to_string(), "PvPenPu"),
            ("p_irr".to_string(), "SysIrrPu"),
            ("ppa_target".to_string(), "SysPpaDpere"),
            (format!("{}.batt{}.properties.batt_kw", inv, battery_index), "EssMaxPPa"),
            (format!("{}.batt{}.properties.batt_kwh", inv, battery_index), "EssMaxEPa"),
        ];
        Self {
            mapping: mapping
                .into_iter()
                .map(|(raw, name)| (raw, name.to_string()))
                .collect(),
        }
    }

    pub fn from_config(cfg: &ReaderConfig) -> Self {
        Self::with_indices(cfg.solar_index, cfg.battery_index)
    }
}

impl Default for RunLogColumns {
    fn default() -> Self {
        Self::with_indices(1, 3)
    }
}

/// Emit `Gs<job>Iter<i><name>` for every mapped column and row; return the
/// row count, which is the job's iteration count.
pub fn parse_run_log(
    job: u64,
    raw: &[u8],
    columns: &RunLogColumns,
    wb: &mut Whiteboard,
) -> Result<usize, IngestError> {
    let table = Table::parse(raw).map_err(|e| IngestError::parse(RUN_LOG, e))?;
    log(
        Level::Debug,
        Domain::RunLog,
        "columns",
        obj(&[("columns", serde_json::json!(table.headers))]),
    );

    for (raw_name, name) in &columns.mapping {
        let Some(cells) = table.column(raw_name) else {
            continue;
        };
        for (i, cell) in cells.iter().enumerate() {
            wb.set(provenance_name(job, Some(i), name), cell_value(cell.as_deref()));
        }
    }
    Ok(table.row_count)
}

fn cell_value(cell: Option<&str>) -> Value {
    match cell {
        None => Value::Number(MISSING_SENTINEL),
        Some(text) => parse_number(text)
            .map(Value::Number)
            .unwrap_or_else(|| Value::Text(text.to_string())),
    }
}
