use std::fmt;

use crate::hint::completion_percent;
use crate::view_model::ProgressView;
use crate::ScrollReport;

/// Hard upper bound on harvest rounds.
pub const SAFETY_CEILING: u64 = 20_000;
/// Consecutive rounds without new records required at the bottom before stopping.
pub const NO_PROGRESS_THRESHOLD: u32 = 5;
/// Rounds between progress reports.
pub const PROGRESS_INTERVAL: u64 = 25;

/// How a round that failed to move the viewport, while not at the bottom,
/// affects the no-progress counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StallPolicy {
    /// The counter follows record growth only.
    #[default]
    Continue,
    /// A stalled round resets the counter to zero.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestPolicy {
    pub safety_ceiling: u64,
    pub no_progress_threshold: u32,
    pub stall_policy: StallPolicy,
    /// `0` disables progress reports.
    pub progress_interval: u64,
}

impl Default for HarvestPolicy {
    fn default() -> Self {
        Self {
            safety_ceiling: SAFETY_CEILING,
            no_progress_threshold: NO_PROGRESS_THRESHOLD,
            stall_policy: StallPolicy::default(),
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    Exhausted,
    SafetyCeilingReached,
    Cancelled,
}

impl CompletionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletionReason::Exhausted => "exhausted",
            CompletionReason::SafetyCeilingReached => "safety_ceiling_reached",
            CompletionReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Scrolling,
    Done(CompletionReason),
}

/// Per-run loop bookkeeping. Dropped once the loop has decided to stop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestState {
    policy: HarvestPolicy,
    phase: Phase,
    round_index: u64,
    consecutive_no_progress_rounds: u32,
    last_accepted_count: usize,
    target_count_hint: Option<u64>,
}

impl HarvestState {
    pub fn new(policy: HarvestPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Seed the advisory total. Zero is treated as "unknown".
    pub fn with_target_hint(mut self, hint: Option<u64>) -> Self {
        self.target_count_hint = hint.filter(|&n| n > 0);
        self
    }

    pub fn policy(&self) -> HarvestPolicy {
        self.policy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    pub fn round_index(&self) -> u64 {
        self.round_index
    }

    pub fn consecutive_no_progress_rounds(&self) -> u32 {
        self.consecutive_no_progress_rounds
    }

    pub fn last_accepted_count(&self) -> usize {
        self.last_accepted_count
    }

    pub fn target_count_hint(&self) -> Option<u64> {
        self.target_count_hint
    }

    pub fn view(&self) -> ProgressView {
        ProgressView {
            round: self.round_index,
            accepted: self.last_accepted_count,
            target_count_hint: self.target_count_hint,
            percent: completion_percent(self.last_accepted_count, self.target_count_hint),
        }
    }

    pub(crate) fn set_target_hint(&mut self, hint: u64) {
        if hint > 0 {
            self.target_count_hint = Some(hint);
        }
    }

    pub(crate) fn begin_round(&mut self) {
        self.round_index += 1;
    }

    pub(crate) fn record_progress(&mut self, accepted_total: usize) {
        if accepted_total > self.last_accepted_count {
            self.last_accepted_count = accepted_total;
            self.consecutive_no_progress_rounds = 0;
        } else {
            self.consecutive_no_progress_rounds =
                self.consecutive_no_progress_rounds.saturating_add(1);
        }
    }

    pub(crate) fn apply_scroll(&mut self, scroll: &ScrollReport) {
        if self.policy.stall_policy == StallPolicy::Reset && scroll.is_stall() {
            self.consecutive_no_progress_rounds = 0;
        }
    }

    /// Exhaustion takes precedence over the safety ceiling.
    pub(crate) fn termination(&self, scroll: &ScrollReport) -> Option<CompletionReason> {
        if scroll.at_bottom()
            && self.consecutive_no_progress_rounds >= self.policy.no_progress_threshold
        {
            return Some(CompletionReason::Exhausted);
        }
        if self.round_index >= self.policy.safety_ceiling {
            return Some(CompletionReason::SafetyCeilingReached);
        }
        None
    }

    pub(crate) fn report_due(&self) -> bool {
        self.policy.progress_interval > 0 && self.round_index % self.policy.progress_interval == 0
    }

    pub(crate) fn finish(&mut self, reason: CompletionReason) {
        self.phase = Phase::Done(reason);
    }
}
