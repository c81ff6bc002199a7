use crate::{CompletionReason, ProgressView};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Wait the settle delay, then run the next round.
    Settle,
    ReportProgress(ProgressView),
    Finish { reason: CompletionReason },
}
