use engine_logging::{engine_debug, engine_info};
use harvester_core::{ScrollPosition, ScrollReport};
use serde_json::{json, Value};

use crate::resolver::{resolve_scroller, Resolution, ScrollerHandle, SCROLLER_MARKER_ATTR};
use crate::{scripts, DriverError, DriverErrorKind, PageDriver};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScrollerState {
    /// Not resolved yet: the last attempt failed or the table was not mounted.
    Pending,
    /// The table has no scrollable container and is fully rendered.
    Missing,
    /// Resolved and rewound to the top.
    Found(ScrollerHandle),
}

/// Moves the table's scroller one viewport per round.
///
/// The scroller is resolved once by [`ScrollAdvancer::prepare`] and cached. It
/// is resolved again only when a cached scroller stops answering, since some
/// widgets swap their scroll container while virtualizing. A resolution that
/// failed, or found no table, is retried on the next advance.
#[derive(Debug, Clone)]
pub struct ScrollAdvancer {
    table_selector: String,
    token: String,
    state: ScrollerState,
}

impl ScrollAdvancer {
    pub fn new(table_selector: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            table_selector: table_selector.into(),
            token: token.into(),
            state: ScrollerState::Pending,
        }
    }

    pub fn handle(&self) -> Option<&ScrollerHandle> {
        match &self.state {
            ScrollerState::Found(handle) => Some(handle),
            _ => None,
        }
    }

    /// Resolve the scroller and rewind it to the top.
    ///
    /// On error the advancer stays unresolved and the next
    /// [`advance`](Self::advance) tries again.
    pub async fn prepare<D>(&mut self, driver: &D) -> Result<Option<&ScrollerHandle>, DriverError>
    where
        D: PageDriver + ?Sized,
    {
        self.state = ScrollerState::Pending;
        self.resolve_and_rewind(driver).await?;
        Ok(self.handle())
    }

    /// Advance by one viewport. Never mutates the page without a scroller.
    ///
    /// While unresolved, the round is spent resolving: a freshly found
    /// scroller is rewound and reported as [`ScrollReport::Skipped`], an
    /// absent table as [`ScrollReport::NoScroller`].
    pub async fn advance<D>(&mut self, driver: &D) -> Result<ScrollReport, DriverError>
    where
        D: PageDriver + ?Sized,
    {
        let handle = match self.state.clone() {
            ScrollerState::Missing => return Ok(ScrollReport::NoScroller),
            ScrollerState::Pending => {
                self.resolve_and_rewind(driver).await?;
                return Ok(match self.state {
                    ScrollerState::Found(_) => ScrollReport::Skipped,
                    _ => ScrollReport::NoScroller,
                });
            }
            ScrollerState::Found(handle) => handle,
        };
        if let Some(position) = step(driver, &handle).await? {
            return Ok(ScrollReport::Advanced(position));
        }

        engine_debug!("Cached scroller vanished; resolving again");
        match resolve_scroller(driver, &self.table_selector, &self.token).await? {
            Resolution::Found(handle) => {
                let report = step(driver, &handle)
                    .await?
                    .map_or(ScrollReport::NoScroller, ScrollReport::Advanced);
                self.state = ScrollerState::Found(handle);
                Ok(report)
            }
            Resolution::NoScroller => {
                self.state = ScrollerState::Missing;
                Ok(ScrollReport::NoScroller)
            }
            Resolution::NoTable => {
                self.state = ScrollerState::Pending;
                Ok(ScrollReport::NoScroller)
            }
        }
    }

    /// The scroller only counts as found once it has been rewound.
    async fn resolve_and_rewind<D>(&mut self, driver: &D) -> Result<(), DriverError>
    where
        D: PageDriver + ?Sized,
    {
        match resolve_scroller(driver, &self.table_selector, &self.token).await? {
            Resolution::Found(handle) => {
                if !reset_to_top(driver, &handle).await? {
                    engine_debug!("Scroller lost its marker before rewinding");
                }
                engine_info!(
                    "Resolved scroller for {} ({:?})",
                    self.table_selector,
                    handle.origin()
                );
                self.state = ScrollerState::Found(handle);
            }
            Resolution::NoScroller => {
                engine_info!(
                    "No scrollable container for {}; treating table as fully rendered",
                    self.table_selector
                );
                self.state = ScrollerState::Missing;
            }
            Resolution::NoTable => {
                engine_debug!("Table {} not mounted yet", self.table_selector);
                self.state = ScrollerState::Pending;
            }
        }
        Ok(())
    }
}

async fn step<D>(driver: &D, handle: &ScrollerHandle) -> Result<Option<ScrollPosition>, DriverError>
where
    D: PageDriver + ?Sized,
{
    let result = driver
        .evaluate(
            scripts::ADVANCE_SCROLLER,
            json!([SCROLLER_MARKER_ATTR, handle.token()]),
        )
        .await?;
    parse_step(&result)
}

fn parse_step(result: &Value) -> Result<Option<ScrollPosition>, DriverError> {
    let ok = result.get("ok").and_then(Value::as_bool).ok_or_else(|| {
        DriverError::new(
            DriverErrorKind::Script,
            format!("unexpected scroll result: {result}"),
        )
    })?;
    if !ok {
        return Ok(None);
    }
    let number = |key: &str| result.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    let (prev, now, max) = (number("prev"), number("now"), number("max"));
    if now < prev {
        engine_debug!("Scroller jumped back from {prev} to {now} (max {max}); content re-laid out");
    }
    Ok(Some(ScrollPosition::new(prev, now, max)))
}

/// Scroll the resolved scroller back to its top. Returns whether it was found.
pub async fn reset_to_top<D>(driver: &D, handle: &ScrollerHandle) -> Result<bool, DriverError>
where
    D: PageDriver + ?Sized,
{
    let result = driver
        .evaluate(
            scripts::RESET_SCROLLER,
            json!([SCROLLER_MARKER_ATTR, handle.token()]),
        )
        .await?;
    Ok(result.get("ok").and_then(Value::as_bool).unwrap_or(false))
}
