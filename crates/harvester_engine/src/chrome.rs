//! [`PageDriver`] backed by a Chromium instance over the DevTools protocol.
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{DriverError, DriverErrorKind, PageDriver};

const SELECTOR_POLL: Duration = Duration::from_millis(100);

const IS_VISIBLE_FN: &str = "function() { \
    if (!this.isConnected) return false; \
    const s = getComputedStyle(this); \
    return s.visibility !== 'hidden' && (this.offsetParent !== null || s.position === 'fixed'); }";
const IS_ENABLED_FN: &str =
    "function() { return !this.disabled && this.getAttribute('aria-disabled') !== 'true'; }";

#[derive(Debug, Clone)]
pub struct ChromeSettings {
    pub headless: bool,
    /// Persistent profile; reusing it keeps an authenticated session between runs.
    pub user_data_dir: Option<PathBuf>,
    pub window_size: (u32, u32),
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            window_size: (1400, 1000),
        }
    }
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    /// Launch Chromium and open `url` in a fresh page.
    pub async fn launch(settings: &ChromeSettings, url: &str) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_size.0, settings.window_size.1);
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder
            .build()
            .map_err(|msg| DriverError::new(DriverErrorKind::Protocol, msg))?;

        let (browser, mut events) = Browser::launch(config).await.map_err(map_cdp_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    engine_warn!("Browser event loop stopped: {err}");
                    break;
                }
            }
        });

        let page = browser.new_page(url).await.map_err(map_cdp_error)?;
        page.wait_for_navigation().await.map_err(map_cdp_error)?;
        engine_debug!("Opened {url}");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    pub async fn close(mut self) -> Result<(), DriverError> {
        let closed = self.browser.close().await.map(|_| ()).map_err(map_cdp_error);
        self.handler.abort();
        closed
    }

    async fn call_on(&self, element: &Element, function: &str) -> Result<Value, DriverError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(map_cdp_error)?;
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromeDriver {
    type Element = Element;

    async fn evaluate(&self, script: &str, args: Value) -> Result<Value, DriverError> {
        let args = match args {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        let expression = format!("({script})(...{})", Value::Array(args));
        let result = self.page.evaluate(expression).await.map_err(map_cdp_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<Element>, DriverError> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements),
            Err(CdpError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(map_cdp_error(err)),
        }
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await.map(|_| ()).map_err(map_cdp_error)
    }

    async fn is_visible(&self, element: &Element) -> Result<bool, DriverError> {
        Ok(self.call_on(element, IS_VISIBLE_FN).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool, DriverError> {
        Ok(self.call_on(element, IS_ENABLED_FN).await?.as_bool().unwrap_or(false))
    }

    async fn inner_text(&self, element: &Element) -> Result<String, DriverError> {
        let text = element.inner_text().await.map_err(map_cdp_error)?;
        Ok(text.unwrap_or_default())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.query_selector(selector).await? {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(DriverError::new(
                    DriverErrorKind::Timeout,
                    format!("{selector} not found within {timeout:?}"),
                ));
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }
}

fn map_cdp_error(err: CdpError) -> DriverError {
    let kind = match &err {
        CdpError::NotFound => DriverErrorKind::NotFound,
        CdpError::Timeout => DriverErrorKind::Timeout,
        CdpError::JavascriptException(_) => DriverErrorKind::Script,
        // Protocol-level replies such as "Could not find node with given id".
        CdpError::Chrome(_) => DriverErrorKind::Detached,
        // Socket and channel failures mean the browser is gone.
        _ => DriverErrorKind::Disconnected,
    };
    DriverError::new(kind, err.to_string())
}
