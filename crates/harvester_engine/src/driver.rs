use std::time::Duration;

use serde_json::Value;

use crate::DriverError;

/// Capability boundary to the rendered page.
///
/// Every call is a single round-trip and is atomic from the caller's side.
/// Implementations report failures as [`DriverError`] and leave the decision
/// between skipping and aborting to the caller.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    type Element: Send + Sync;

    /// Run `script`, a JS function expression, with `args` spread as its
    /// arguments and return its JSON result.
    async fn evaluate(&self, script: &str, args: Value) -> Result<Value, DriverError>;

    async fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, DriverError>;

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool, DriverError>;

    async fn inner_text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Wait until `selector` matches, failing with a timeout error otherwise.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    /// Cooperative delay.
    async fn wait_for(&self, duration: Duration) -> Result<(), DriverError> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}
