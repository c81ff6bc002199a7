#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A round finished extracting and scrolling.
    RoundObserved {
        /// Ledger size after this round's candidates were offered.
        accepted_total: usize,
        scroll: crate::ScrollReport,
    },
    /// The advisory total was read from the page.
    TargetHintDetected(u64),
    /// The caller asked the loop to stop between rounds.
    CancelRequested,
}
