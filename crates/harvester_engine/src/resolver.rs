use serde_json::{json, Value};

use crate::{scripts, DriverError, DriverErrorKind, PageDriver};

/// Attribute the resolver uses to tag the scroller it found.
pub const SCROLLER_MARKER_ATTR: &str = "data-harvest-scroller";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollerOrigin {
    Ancestor,
    Descendant,
}

/// Reference to a resolved scroller, addressed in the page by its marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollerHandle {
    token: String,
    origin: ScrollerOrigin,
}

impl ScrollerHandle {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn origin(&self) -> ScrollerOrigin {
        self.origin
    }
}

/// What a resolution attempt found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ScrollerHandle),
    /// The table is mounted but nothing around it scrolls: it is fully rendered.
    NoScroller,
    /// The table is not mounted (yet).
    NoTable,
}

/// Locate the element whose scroll position drives the table's virtualization.
pub async fn resolve_scroller<D>(
    driver: &D,
    table_selector: &str,
    token: &str,
) -> Result<Resolution, DriverError>
where
    D: PageDriver + ?Sized,
{
    let result = driver
        .evaluate(
            scripts::RESOLVE_SCROLLER,
            json!([table_selector, SCROLLER_MARKER_ATTR, token]),
        )
        .await?;
    parse_resolution(&result, token)
}

fn parse_resolution(result: &Value, token: &str) -> Result<Resolution, DriverError> {
    let found = result
        .get("found")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            DriverError::new(
                DriverErrorKind::Script,
                format!("unexpected resolver result: {result}"),
            )
        })?;
    if !found {
        return Ok(match result.get("reason").and_then(Value::as_str) {
            Some("no-table") => Resolution::NoTable,
            _ => Resolution::NoScroller,
        });
    }
    let origin = match result.get("origin").and_then(Value::as_str) {
        Some("descendant") => ScrollerOrigin::Descendant,
        _ => ScrollerOrigin::Ancestor,
    };
    Ok(Resolution::Found(ScrollerHandle {
        token: token.to_owned(),
        origin,
    }))
}
