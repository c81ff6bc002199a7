use std::path::{Path, PathBuf};
use std::sync::Arc;

use harvester_core::{completion_percent, CompletionReason, Projection, Record};
use serde_json::{json, Map, Value};

use crate::persist::{write_atomically, PersistError};

/// Clock used to stamp the manifest.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct ExportOptions {
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub harvested_utc: Clock,
}

impl ExportOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            manifest_path: None,
            harvested_utc: Arc::new(String::new),
        }
    }
}

/// What the harvest produced, independent of how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportContext {
    /// `None` when the run aborted on a driver failure.
    pub reason: Option<CompletionReason>,
    pub rounds: u64,
    pub target_count_hint: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub count: usize,
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub completion_percent: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One artifact object: `id`, the positional projections, and the raw cells.
pub fn record_to_json(record: &Record) -> Value {
    let mut obj = Map::new();
    obj.insert("id".into(), Value::String(record.key().to_owned()));
    for projection in Projection::ALL {
        let value = record.projection(projection).unwrap_or_default();
        obj.insert(projection.field_name().into(), Value::String(value.to_owned()));
    }
    obj.insert("cells".into(), json!(record.fields()));
    Value::Object(obj)
}

/// Write the records as a pretty-printed JSON array, plus the manifest if asked.
pub fn export_records(
    records: &[Record],
    context: ExportContext,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let array = Value::Array(records.iter().map(record_to_json).collect());
    let body = serde_json::to_string_pretty(&array)?;
    let output_path = write_atomically(&options.output_path, &body)?;

    let percent = completion_percent(records.len(), context.target_count_hint);
    let manifest_path = match &options.manifest_path {
        Some(path) => {
            let manifest = json!({
                "count": records.len(),
                "reason": context.reason.map_or("driver_failure", CompletionReason::as_str),
                "rounds": context.rounds,
                "target_count_hint": context.target_count_hint,
                "completion_percent": percent,
                "harvested_utc": (options.harvested_utc)(),
                "output_file": file_name(&output_path),
            });
            Some(write_atomically(path, &serde_json::to_string_pretty(&manifest)?)?)
        }
        None => None,
    };

    Ok(ExportSummary {
        count: records.len(),
        output_path,
        manifest_path,
        completion_percent: percent,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
