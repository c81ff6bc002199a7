use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_trace};
use harvester_core::{
    update, CompletionReason, DedupLedger, Effect, HarvestState, Msg, Phase, ScrollReport,
};
use tokio_util::sync::CancellationToken;

use crate::advancer::ScrollAdvancer;
use crate::extractor::extract_rows;
use crate::sink::{LogProgressSink, ProgressSink};
use crate::{
    DriverError, HarvestError, HarvestEvent, HarvestOutcome, HarvestSettings, PageDriver,
};

/// Drives extraction, deduplication and scrolling until the table is exhausted,
/// the safety ceiling is hit, or the run is cancelled.
///
/// One harvest owns the page for its whole duration: every driver call is
/// awaited before the next is issued, so rows are never read against a scroll
/// that has not landed yet.
pub struct Harvester {
    settings: HarvestSettings,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Harvester {
    pub fn new(settings: HarvestSettings) -> Self {
        Self {
            settings,
            sink: Arc::new(LogProgressSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Harvest every row the table at `table_selector` exposes.
    ///
    /// `target_count_hint` only feeds progress percentages. Transient driver
    /// failures skip the affected step; any other failure aborts with the
    /// records accepted so far.
    pub async fn harvest<D>(
        &self,
        driver: &D,
        table_selector: &str,
        target_count_hint: Option<u64>,
    ) -> Result<HarvestOutcome, HarvestError>
    where
        D: PageDriver + ?Sized,
    {
        let mut ledger = DedupLedger::new();
        let mut state = HarvestState::new(self.settings.policy);
        if let Some(hint) = target_count_hint {
            state = update(state, Msg::TargetHintDetected(hint)).0;
        }
        self.sink.emit(HarvestEvent::Started {
            table_selector: table_selector.to_owned(),
            target_count_hint: state.target_count_hint(),
        });

        if let Err(err) = focus_table(driver, table_selector).await {
            self.absorb(err, 0).map_err(|source| failure(source, DedupLedger::new(), 0))?;
        }

        let mut advancer = ScrollAdvancer::new(table_selector, next_marker_token());
        if let Err(err) = advancer.prepare(driver).await {
            self.absorb(err, 0).map_err(|source| failure(source, DedupLedger::new(), 0))?;
        }

        loop {
            if self.cancel.is_cancelled() {
                state = update(state, Msg::CancelRequested).0;
            }
            if let Phase::Done(reason) = state.phase() {
                return Ok(self.finish(ledger, &state, reason));
            }

            let round = state.round_index() + 1;
            engine_logging::set_round(round);

            let candidates = match extract_rows(driver, table_selector).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    if let Err(source) = self.absorb(err, round) {
                        return Err(failure(source, ledger, round));
                    }
                    Vec::new()
                }
            };
            let offered = candidates.len();
            let fresh = ledger.accept_all(candidates);
            engine_trace!("{offered} rows rendered, {fresh} new, {} total", ledger.size());

            let scroll = match advancer.advance(driver).await {
                Ok(report) => report,
                Err(err) => {
                    if let Err(source) = self.absorb(err, round) {
                        return Err(failure(source, ledger, round));
                    }
                    ScrollReport::Skipped
                }
            };
            engine_debug!("scroll {scroll:?}");

            let (next, effects) = update(
                state,
                Msg::RoundObserved {
                    accepted_total: ledger.size(),
                    scroll,
                },
            );
            state = next;

            for effect in effects {
                match effect {
                    Effect::ReportProgress(view) => self.sink.emit(HarvestEvent::Progress(view)),
                    Effect::Finish { reason } => return Ok(self.finish(ledger, &state, reason)),
                    Effect::Settle => {
                        if let Err(err) = self.settle(driver).await {
                            if let Err(source) = self.absorb(err, round) {
                                return Err(failure(source, ledger, round));
                            }
                        }
                    }
                }
            }
        }
    }

    /// Swallow a transient failure as a skipped step; hand back a fatal one.
    fn absorb(&self, err: DriverError, round: u64) -> Result<(), DriverError> {
        if !err.is_transient() {
            return Err(err);
        }
        self.sink.emit(HarvestEvent::RoundSkipped { round, error: err });
        Ok(())
    }

    async fn settle<D>(&self, driver: &D) -> Result<(), DriverError>
    where
        D: PageDriver + ?Sized,
    {
        tokio::select! {
            res = driver.wait_for(self.settings.settle_delay) => res,
            () = self.cancel.cancelled() => Ok(()),
        }
    }

    fn finish(
        &self,
        ledger: DedupLedger,
        state: &HarvestState,
        reason: CompletionReason,
    ) -> HarvestOutcome {
        engine_logging::set_round(0);
        self.sink.emit(HarvestEvent::Finished {
            reason,
            accepted: ledger.size(),
            rounds: state.round_index(),
        });
        HarvestOutcome {
            records: ledger.into_records(),
            reason,
            rounds: state.round_index(),
            target_count_hint: state.target_count_hint(),
        }
    }
}

fn failure(source: DriverError, ledger: DedupLedger, round: u64) -> HarvestError {
    engine_logging::set_round(0);
    HarvestError::Driver {
        source,
        partial: ledger.into_records(),
        round,
    }
}

/// Some widgets only react to scrolling once the table has focus.
async fn focus_table<D>(driver: &D, table_selector: &str) -> Result<(), DriverError>
where
    D: PageDriver + ?Sized,
{
    if let Some(table) = driver.query_selector(table_selector).await? {
        driver.click(&table).await?;
    }
    Ok(())
}

fn next_marker_token() -> String {
    static RUNS: AtomicU64 = AtomicU64::new(0);
    let run = RUNS.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{}-{run}", std::process::id())
}
