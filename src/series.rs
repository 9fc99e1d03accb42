use crate::error::IngestError;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::names::{map_column_name, provenance_name};
use crate::table::{parse_number, Table};
use crate::whiteboard::{Value, Whiteboard};

/// Filename of the hourly operations table for an iteration, or the aggregate run.
pub fn hourly_artifact(iteration: Option<usize>) -> String {
    match iteration {
        Some(i) => format!("results/annual_hourly_ops_iteration_{}.csv", i),
        None => "results/annual_hourly_ops.csv".to_string(),
    }
}

/// Store every mapped column under its bare name and its provenance name.
/// Returns the number of columns stored; unmapped columns are dropped.
pub fn load_series(
    job: u64,
    iteration: Option<usize>,
    raw: &[u8],
    wb: &mut Whiteboard,
) -> Result<usize, IngestError> {
    let artifact = hourly_artifact(iteration);
    let table = Table::parse(raw).map_err(|e| IngestError::parse(&artifact, e))?;

    let mut stored = 0usize;
    for (header, cells) in table.headers.iter().zip(&table.columns) {
        let Some(name) = map_column_name(header) else {
            log(Level::Trace, Domain::Series, "drop", obj(&[("column", v_str(header))]));
            continue;
        };
        let value = column_value(cells);
        wb.set(provenance_name(job, iteration, &name), value.clone());
        wb.set(name, value);
        stored += 1;
    }
    Ok(stored)
}

/// `Series` when every non-empty cell is numeric, `Labels` otherwise.
fn column_value(cells: &[Option<String>]) -> Value {
    let numeric: Option<Vec<f64>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(f64::NAN),
            Some(text) => parse_number(text),
        })
        .collect();
    match numeric {
        Some(series) => Value::Series(series),
        None => Value::Labels(cells.iter().map(|c| c.clone().unwrap_or_default()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURLY: &str = "\
Hour,Total Load [kW],genset1 [kW],genset1 [status],genset1 fuel [L],Mode
0,10,5,True,1.5,grid
1,12,,False,0,island
2,14,7,True,2.0,grid
";

    #[test]
    fn test_artifact_names() {
        assert_eq!(hourly_artifact(Some(2)), "results/annual_hourly_ops_iteration_2.csv");
        assert_eq!(hourly_artifact(None), "results/annual_hourly_ops.csv");
    }

    #[test]
    fn test_iteration_columns_stored_twice() {
        let mut wb = Whiteboard::new();
        let stored = load_series(1588, Some(0), HOURLY.as_bytes(), &mut wb).unwrap();
        assert_eq!(stored, 4);
        assert_eq!(wb.get("LoadP").and_then(Value::as_series), Some(&[10.0, 12.0, 14.0][..]));
        assert_eq!(wb.get("Gs1588Iter0LoadP"), wb.get("LoadP"));
        assert_eq!(wb.get("Gen1St").and_then(Value::as_series), Some(&[1.0, 0.0, 1.0][..]));
        assert!(wb.get("Gs1588Iter0Gen1FuelLperh").is_some());
        assert!(wb.names_matching("*Hour*").unwrap().is_empty());
        assert!(wb.names_matching("*Mode*").unwrap().is_empty());
        assert_eq!(wb.len(), 8);
    }

    #[test]
    fn test_missing_cells_become_nan() {
        let mut wb = Whiteboard::new();
        load_series(1, None, HOURLY.as_bytes(), &mut wb).unwrap();
        let gen = wb.get("Gs1Gen1P").and_then(Value::as_series).unwrap();
        assert_eq!(gen[0], 5.0);
        assert!(gen[1].is_nan());
    }

    #[test]
    fn test_later_iteration_wins_bare_name() {
        let mut wb = Whiteboard::new();
        load_series(5, Some(0), b"Total Grid [kW]\n1\n", &mut wb).unwrap();
        load_series(5, Some(1), b"Total Grid [kW]\n2\n", &mut wb).unwrap();
        assert_eq!(wb.get("GridP").and_then(Value::as_series), Some(&[2.0][..]));
        assert_eq!(wb.get("Gs5Iter0GridP").and_then(Value::as_series), Some(&[1.0][..]));
    }

    #[test]
    fn test_missing_tokens_keep_series_numeric() {
        let mut wb = Whiteboard::new();
        load_series(5, None, b"Total Load [kW]\n1\nNA\n3\n", &mut wb).unwrap();
        let load = wb.get("LoadP").and_then(Value::as_series).unwrap();
        assert_eq!(load[0], 1.0);
        assert!(load[1].is_nan());
        wb.compute_statistics();
        assert_eq!(wb.get("LoadP_mean").and_then(Value::as_number), Some(2.0));
        assert_eq!(wb.get("LoadP_sum").and_then(Value::as_number), Some(4.0));
    }

    #[test]
    fn test_non_numeric_column_is_labels() {
        let mut wb = Whiteboard::new();
        load_series(5, None, b"All Generators [kW]\noffline\n3\n", &mut wb).unwrap();
        assert_eq!(
            wb.get("GenP"),
            Some(&Value::Labels(vec!["offline".to_string(), "3".to_string()]))
        );
    }

    #[test]
    fn test_empty_payload_is_parse_failure() {
        let mut wb = Whiteboard::new();
        let err = load_series(5, Some(3), b"", &mut wb).unwrap_err();
        assert!(err.to_string().contains("annual_hourly_ops_iteration_3.csv"));
    }
}
