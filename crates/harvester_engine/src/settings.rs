use std::time::Duration;

use harvester_core::HarvestPolicy;

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub policy: HarvestPolicy,
    /// Pause after each round so the widget can mount the next batch.
    pub settle_delay: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            policy: HarvestPolicy::default(),
            settle_delay: Duration::from_millis(200),
        }
    }
}

/// How the table root is found before harvesting.
#[derive(Debug, Clone)]
pub struct LocateSettings {
    /// Anything that signals the table has started rendering.
    pub ready_selector: String,
    pub ready_timeout: Duration,
    /// Tried in order; the first visible match wins.
    pub candidates: Vec<String>,
    pub fallback: String,
}

impl Default for LocateSettings {
    fn default() -> Self {
        Self {
            ready_selector: "table, [role=table], tbody tr".to_string(),
            ready_timeout: Duration::from_millis(5_000),
            candidates: vec![
                "table".to_string(),
                "[role=table]".to_string(),
                "[role=grid]".to_string(),
            ],
            fallback: "table".to_string(),
        }
    }
}
