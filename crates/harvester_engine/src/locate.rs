use engine_logging::{engine_info, engine_warn};
use harvester_core::detect_count_hint;
use serde_json::{json, Value};

use crate::{scripts, DriverError, DriverErrorKind, LocateSettings, PageDriver};

/// Pick the selector of the rendered table.
///
/// Waiting for the table is best-effort: a timeout only logs, and when no
/// candidate is visible the configured fallback is returned so the extractor
/// can still discover rows once it runs.
pub async fn locate_table<D>(driver: &D, settings: &LocateSettings) -> Result<String, DriverError>
where
    D: PageDriver + ?Sized,
{
    match driver
        .wait_for_selector(&settings.ready_selector, settings.ready_timeout)
        .await
    {
        Ok(_) => {}
        Err(err) if err.kind == DriverErrorKind::Timeout => {
            engine_warn!("Table load timeout - proceeding anyway");
        }
        Err(err) if err.is_transient() => {
            engine_warn!("Waiting for table failed: {err}");
        }
        Err(err) => return Err(err),
    }

    for candidate in &settings.candidates {
        if is_visible_match(driver, candidate).await? {
            engine_info!("Using table selector: {candidate}");
            return Ok(candidate.clone());
        }
    }
    engine_info!("No visible table candidate; falling back to {}", settings.fallback);
    Ok(settings.fallback.clone())
}

async fn is_visible_match<D>(driver: &D, selector: &str) -> Result<bool, DriverError>
where
    D: PageDriver + ?Sized,
{
    let outcome = match driver.query_selector(selector).await {
        Ok(Some(element)) => driver.is_visible(&element).await,
        Ok(None) => Ok(false),
        Err(err) => Err(err),
    };
    match outcome {
        Ok(visible) => Ok(visible),
        Err(err) if err.is_transient() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Read the advisory total from the page's "showing k of N" banner.
pub async fn read_count_hint<D>(driver: &D) -> Result<Option<u64>, DriverError>
where
    D: PageDriver + ?Sized,
{
    let text = match driver.evaluate(scripts::PAGE_TEXT, json!([])).await? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => {
            return Err(DriverError::new(
                DriverErrorKind::Script,
                format!("page text returned {other}"),
            ))
        }
    };
    let hint = detect_count_hint(&text);
    match hint {
        Some(total) => engine_info!("Detected {total} total rows"),
        None if text.to_lowercase().contains("showing") => {
            engine_info!("Row banner present but total is zero or unreadable");
        }
        None => {}
    }
    Ok(hint)
}
