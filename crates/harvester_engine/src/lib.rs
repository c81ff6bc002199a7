//! Harvester engine: page-driver plumbing and the virtualized-table harvest loop.
mod advancer;
#[cfg(feature = "chrome")]
mod chrome;
mod driver;
mod export;
mod extractor;
mod harvest;
mod locate;
mod navigate;
mod persist;
mod resolver;
pub mod scripts;
mod settings;
mod sink;
mod types;

pub use advancer::{reset_to_top, ScrollAdvancer};
#[cfg(feature = "chrome")]
pub use chrome::{ChromeDriver, ChromeSettings};
pub use driver::PageDriver;
pub use export::{
    export_records, record_to_json, Clock, ExportContext, ExportError, ExportOptions,
    ExportSummary,
};
pub use extractor::extract_rows;
pub use harvest::Harvester;
pub use locate::{locate_table, read_count_hint};
pub use navigate::{click_button_by_text, complete_step, run_wizard, WizardStep};
pub use persist::{ensure_output_dir, write_atomically, PersistError};
pub use resolver::{
    resolve_scroller, Resolution, ScrollerHandle, ScrollerOrigin, SCROLLER_MARKER_ATTR,
};
pub use settings::{HarvestSettings, LocateSettings};
pub use sink::{ChannelProgressSink, LogProgressSink, ProgressSink};
pub use types::{DriverError, DriverErrorKind, HarvestError, HarvestEvent, HarvestOutcome};
