use harvester_core::Record;
use serde_json::{json, Value};

use crate::{scripts, DriverError, DriverErrorKind, PageDriver};

/// Read the currently rendered, visible rows of the table in one round-trip.
///
/// Rows whose first cell is empty are dropped. A missing table yields an empty
/// list; deduplication is left to the ledger.
pub async fn extract_rows<D>(driver: &D, table_selector: &str) -> Result<Vec<Record>, DriverError>
where
    D: PageDriver + ?Sized,
{
    let result = driver
        .evaluate(scripts::EXTRACT_ROWS, json!([table_selector]))
        .await?;
    parse_rows(result)
}

fn parse_rows(result: Value) -> Result<Vec<Record>, DriverError> {
    let rows = match result {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => rows,
        other => {
            return Err(DriverError::new(
                DriverErrorKind::Script,
                format!("row extraction returned {other}"),
            ))
        }
    };

    let records = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Array(cells) => Record::from_cells(cells.iter().map(cell_text)),
            _ => None,
        })
        .collect();
    Ok(records)
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
