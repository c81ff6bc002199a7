#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressView {
    pub round: u64,
    pub accepted: usize,
    pub target_count_hint: Option<u64>,
    /// Accepted count as a percentage of the hint, when one is known.
    pub percent: Option<f64>,
}
