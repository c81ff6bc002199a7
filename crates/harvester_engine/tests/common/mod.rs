//! In-memory page drivers that imitate a virtualized table widget.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use harvester_engine::{scripts, DriverError, DriverErrorKind, PageDriver};
use serde_json::{json, Value};

pub const TABLE: &str = "table";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockElement {
    Table,
    Button(usize),
}

#[derive(Debug, Clone)]
pub struct MockButton {
    pub text: String,
    pub visible: bool,
    pub enabled: bool,
}

impl MockButton {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            visible: true,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub prev: f64,
    pub now: f64,
    pub max: f64,
}

#[derive(Debug, Default)]
struct Page {
    rows: Vec<Vec<String>>,
    /// Rows that fit in the viewport; also the scroll step in row units.
    window: usize,
    /// Extra rows the widget keeps mounted above the viewport.
    overscan: usize,
    table_present: bool,
    /// Extract call (1-based) from which a late table is mounted.
    mount_at_extract: Option<usize>,
    scroll_top: usize,
    marker: Option<String>,
    banner: String,
    buttons: Vec<MockButton>,
}

#[derive(Default)]
struct Calls {
    counts: HashMap<&'static str, usize>,
    clicks: Vec<String>,
    waits: Vec<Duration>,
    samples: Vec<ScrollSample>,
}

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// A table of `rows`, `window` of them visible at a time.
pub struct VirtualTableDriver {
    page: Mutex<Page>,
    calls: Mutex<Calls>,
    /// Per script name, the 1-based call numbers that fail and how.
    failures: Mutex<HashMap<&'static str, HashMap<usize, DriverError>>>,
    /// Advance calls (1-based) on which the widget swaps its scroll container.
    swap_scroller_on: Mutex<Vec<usize>>,
    on_extract: Mutex<Option<Hook>>,
}

pub fn keyed_rows(count: usize) -> Vec<Vec<String>> {
    (1..=count)
        .map(|i| vec![format!("ID-{i:04}"), format!("cat-{}", i % 3), "red".to_string()])
        .collect()
}

impl VirtualTableDriver {
    pub fn new(rows: Vec<Vec<String>>, window: usize) -> Self {
        Self {
            page: Mutex::new(Page {
                rows,
                window,
                table_present: true,
                ..Page::default()
            }),
            calls: Mutex::new(Calls::default()),
            failures: Mutex::new(HashMap::new()),
            swap_scroller_on: Mutex::new(Vec::new()),
            on_extract: Mutex::new(None),
        }
    }

    pub fn without_table() -> Self {
        let driver = Self::new(Vec::new(), 4);
        driver.page.lock().unwrap().table_present = false;
        driver
    }

    /// The table is absent until the `nth` extraction, when it mounts.
    pub fn mounted_late(self, nth: usize) -> Self {
        {
            let mut page = self.page.lock().unwrap();
            page.table_present = false;
            page.mount_at_extract = Some(nth);
        }
        self
    }

    pub fn with_overscan(self, overscan: usize) -> Self {
        self.page.lock().unwrap().overscan = overscan;
        self
    }

    pub fn with_banner(self, banner: &str) -> Self {
        self.page.lock().unwrap().banner = banner.to_string();
        self
    }

    pub fn with_buttons(self, buttons: Vec<MockButton>) -> Self {
        self.page.lock().unwrap().buttons = buttons;
        self
    }

    /// Make the `nth` call (1-based) of `name` fail, e.g. `"extract"` or `"advance"`.
    pub fn fail_call(&self, name: &'static str, nth: usize, kind: DriverErrorKind) {
        self.failures
            .lock()
            .unwrap()
            .entry(name)
            .or_default()
            .insert(nth, DriverError::new(kind, "injected"));
    }

    pub fn swap_scroller_on_advance(&self, nth: usize) {
        self.swap_scroller_on.lock().unwrap().push(nth);
    }

    pub fn on_extract(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_extract.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn set_scroll_top(&self, top: usize) {
        self.page.lock().unwrap().scroll_top = top;
    }

    pub fn scroll_top(&self) -> usize {
        self.page.lock().unwrap().scroll_top
    }

    pub fn count(&self, name: &'static str) -> usize {
        self.calls.lock().unwrap().counts.get(name).copied().unwrap_or(0)
    }

    pub fn clicks(&self) -> Vec<String> {
        self.calls.lock().unwrap().clicks.clone()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().waits.clone()
    }

    pub fn scroll_samples(&self) -> Vec<ScrollSample> {
        self.calls.lock().unwrap().samples.clone()
    }

    fn bump(&self, name: &'static str) -> Result<usize, DriverError> {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.counts.entry(name).or_insert(0);
            *count += 1;
            *count
        };
        let injected = self
            .failures
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(|by_call| by_call.remove(&nth));
        match injected {
            Some(err) => Err(err),
            None => Ok(nth),
        }
    }

    fn resolve(&self, args: &Value) -> Value {
        let mut page = self.page.lock().unwrap();
        if !page.table_present {
            return json!({"found": false, "reason": "no-table"});
        }
        if page.rows.len() <= page.window {
            page.marker = None;
            return json!({"found": false, "reason": "no-scroller"});
        }
        page.marker = args[2].as_str().map(str::to_string);
        json!({"found": true, "origin": "ancestor"})
    }

    fn advance(&self, nth: usize, args: &Value) -> Value {
        if self.swap_scroller_on.lock().unwrap().contains(&nth) {
            self.page.lock().unwrap().marker = None;
        }
        let mut page = self.page.lock().unwrap();
        let token = args[1].as_str().map(str::to_string);
        if page.marker.is_none() || page.marker != token || page.rows.len() <= page.window {
            return json!({"ok": false, "reason": "no-scroller"});
        }
        let max = page.rows.len() - page.window;
        let prev = page.scroll_top;
        let now = (prev + page.window).min(max);
        page.scroll_top = now;
        self.calls.lock().unwrap().samples.push(ScrollSample {
            prev: prev as f64,
            now: now as f64,
            max: max as f64,
        });
        json!({"ok": true, "prev": prev, "now": now, "max": max})
    }

    fn reset(&self, args: &Value) -> Value {
        let mut page = self.page.lock().unwrap();
        let token = args[1].as_str().map(str::to_string);
        if page.marker.is_none() || page.marker != token {
            return json!({"ok": false});
        }
        page.scroll_top = 0;
        json!({"ok": true})
    }

    fn extract(&self, nth: usize) -> Value {
        let rows = {
            let mut page = self.page.lock().unwrap();
            if page.mount_at_extract.is_some_and(|at| nth >= at) {
                page.table_present = true;
            }
            if !page.table_present {
                return Value::Null;
            }
            let start = page.scroll_top.saturating_sub(page.overscan);
            let end = (page.scroll_top + page.window).min(page.rows.len());
            page.rows.get(start..end).unwrap_or_default().to_vec()
        };
        if let Some(hook) = self.on_extract.lock().unwrap().as_ref() {
            hook(nth);
        }
        json!(rows)
    }
}

fn script_name(script: &str) -> &'static str {
    match script {
        s if s == scripts::RESOLVE_SCROLLER => "resolve",
        s if s == scripts::ADVANCE_SCROLLER => "advance",
        s if s == scripts::RESET_SCROLLER => "reset",
        s if s == scripts::EXTRACT_ROWS => "extract",
        s if s == scripts::PAGE_TEXT => "page_text",
        _ => "unknown",
    }
}

#[async_trait::async_trait]
impl PageDriver for VirtualTableDriver {
    type Element = MockElement;

    async fn evaluate(&self, script: &str, args: Value) -> Result<Value, DriverError> {
        let name = script_name(script);
        let nth = self.bump(name)?;
        let result = match name {
            "resolve" => self.resolve(&args),
            "advance" => self.advance(nth, &args),
            "reset" => self.reset(&args),
            "extract" => self.extract(nth),
            "page_text" => json!(self.page.lock().unwrap().banner),
            _ => {
                return Err(DriverError::new(
                    DriverErrorKind::Script,
                    "unknown script",
                ))
            }
        };
        Ok(result)
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<MockElement>, DriverError> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<MockElement>, DriverError> {
        self.bump("query")?;
        let page = self.page.lock().unwrap();
        if selector == "button, [role=button]" {
            return Ok((0..page.buttons.len()).map(MockElement::Button).collect());
        }
        if selector == TABLE && page.table_present {
            return Ok(vec![MockElement::Table]);
        }
        Ok(Vec::new())
    }

    async fn click(&self, element: &MockElement) -> Result<(), DriverError> {
        self.bump("click")?;
        let label = match element {
            MockElement::Table => "table".to_string(),
            MockElement::Button(i) => self.page.lock().unwrap().buttons[*i].text.clone(),
        };
        self.calls.lock().unwrap().clicks.push(label);
        Ok(())
    }

    async fn is_visible(&self, element: &MockElement) -> Result<bool, DriverError> {
        Ok(match element {
            MockElement::Table => self.page.lock().unwrap().table_present,
            MockElement::Button(i) => self.page.lock().unwrap().buttons[*i].visible,
        })
    }

    async fn is_enabled(&self, element: &MockElement) -> Result<bool, DriverError> {
        Ok(match element {
            MockElement::Table => true,
            MockElement::Button(i) => self.page.lock().unwrap().buttons[*i].enabled,
        })
    }

    async fn inner_text(&self, element: &MockElement) -> Result<String, DriverError> {
        Ok(match element {
            MockElement::Table => String::new(),
            MockElement::Button(i) => self.page.lock().unwrap().buttons[*i].text.clone(),
        })
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<MockElement, DriverError> {
        if self.page.lock().unwrap().table_present {
            return Ok(MockElement::Table);
        }
        Err(DriverError::new(
            DriverErrorKind::Timeout,
            format!("{selector} not found within {timeout:?}"),
        ))
    }

    async fn wait_for(&self, duration: Duration) -> Result<(), DriverError> {
        self.bump("wait")?;
        self.calls.lock().unwrap().waits.push(duration);
        tokio::task::yield_now().await;
        Ok(())
    }
}

/// A table that keeps growing and never reports reaching its bottom.
#[derive(Default)]
pub struct EndlessDriver {
    extracts: Mutex<u64>,
    offset: Mutex<f64>,
}

#[async_trait::async_trait]
impl PageDriver for EndlessDriver {
    type Element = ();

    async fn evaluate(&self, script: &str, _args: Value) -> Result<Value, DriverError> {
        if script == scripts::RESOLVE_SCROLLER {
            return Ok(json!({"found": true, "origin": "descendant"}));
        }
        if script == scripts::EXTRACT_ROWS {
            let mut n = self.extracts.lock().unwrap();
            *n += 1;
            return Ok(json!([[format!("row-{}", *n)]]));
        }
        if script == scripts::ADVANCE_SCROLLER {
            let mut offset = self.offset.lock().unwrap();
            let prev = *offset;
            *offset += 50.0;
            return Ok(json!({"ok": true, "prev": prev, "now": *offset, "max": *offset + 1000.0}));
        }
        Ok(json!({"ok": true}))
    }

    async fn query_selector(&self, _selector: &str) -> Result<Option<()>, DriverError> {
        Ok(None)
    }

    async fn query_selector_all(&self, _selector: &str) -> Result<Vec<()>, DriverError> {
        Ok(Vec::new())
    }

    async fn click(&self, _element: &()) -> Result<(), DriverError> {
        Ok(())
    }

    async fn is_visible(&self, _element: &()) -> Result<bool, DriverError> {
        Ok(false)
    }

    async fn is_enabled(&self, _element: &()) -> Result<bool, DriverError> {
        Ok(false)
    }

    async fn inner_text(&self, _element: &()) -> Result<String, DriverError> {
        Ok(String::new())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        Err(DriverError::new(DriverErrorKind::Timeout, selector))
    }

    async fn wait_for(&self, _duration: Duration) -> Result<(), DriverError> {
        Ok(())
    }
}
