use engine_logging::{engine_info, engine_warn};

use crate::HarvestEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<HarvestEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<HarvestEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: HarvestEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes harvest events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::Started {
                table_selector,
                target_count_hint,
            } => match target_count_hint {
                Some(hint) => engine_info!(
                    "Starting collection from {table_selector} (until exhausted). Target hint: {hint}"
                ),
                None => engine_info!("Starting collection from {table_selector} (until exhausted)"),
            },
            HarvestEvent::Progress(view) => match view.percent {
                Some(pct) => engine_info!(
                    "Progress: {} items collected ({pct:.1}% est) after {} rounds",
                    view.accepted,
                    view.round
                ),
                None => engine_info!(
                    "Progress: {} items collected after {} rounds",
                    view.accepted,
                    view.round
                ),
            },
            HarvestEvent::RoundSkipped { round, error } => {
                engine_warn!("Round {round} skipped: {error}");
            }
            HarvestEvent::Finished {
                reason,
                accepted,
                rounds,
            } => engine_info!(
                "Collection complete: {accepted} items after {rounds} rounds ({reason})"
            ),
        }
    }
}
