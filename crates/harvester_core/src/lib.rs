//! Harvester core: pure harvest state machine, dedup ledger and record model.
mod effect;
mod hint;
mod ledger;
mod msg;
mod record;
mod scroll;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use hint::{completion_percent, detect_count_hint};
pub use ledger::DedupLedger;
pub use msg::Msg;
pub use record::{Projection, Record};
pub use scroll::{ScrollPosition, ScrollReport};
pub use state::{
    CompletionReason, HarvestPolicy, HarvestState, Phase, StallPolicy, NO_PROGRESS_THRESHOLD,
    PROGRESS_INTERVAL, SAFETY_CEILING,
};
pub use update::update;
pub use view_model::ProgressView;
