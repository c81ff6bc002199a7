/// Scroll offsets reported by one advance, normalised so that
/// `0 <= previous <= now <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub previous: f64,
    pub now: f64,
    pub max: f64,
}

impl ScrollPosition {
    pub fn new(previous: f64, now: f64, max: f64) -> Self {
        let max = finite_or_zero(max).max(0.0);
        let previous = finite_or_zero(previous).clamp(0.0, max);
        let now = finite_or_zero(now).clamp(previous, max);
        Self { previous, now, max }
    }

    pub fn reached_bottom(&self) -> bool {
        self.now >= self.max
    }

    pub fn moved(&self) -> bool {
        self.now > self.previous
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Outcome of one scroll advance as seen by the harvest state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollReport {
    /// The scroller was written; carries the resulting offsets.
    Advanced(ScrollPosition),
    /// No scrollable element exists; the table is bottom by definition.
    NoScroller,
    /// The advance failed transiently and the round's scroll was skipped.
    Skipped,
}

impl ScrollReport {
    pub fn at_bottom(&self) -> bool {
        match self {
            ScrollReport::Advanced(position) => position.reached_bottom(),
            ScrollReport::NoScroller => true,
            ScrollReport::Skipped => false,
        }
    }

    /// The viewport did not move although the bottom was not reached.
    pub fn is_stall(&self) -> bool {
        match self {
            ScrollReport::Advanced(position) => !position.moved() && !position.reached_bottom(),
            ScrollReport::NoScroller => false,
            ScrollReport::Skipped => true,
        }
    }
}
