use crate::{CompletionReason, Effect, HarvestState, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Once the state is done every message is ignored, so a finished run can
/// never be restarted or finished twice.
pub fn update(mut state: HarvestState, msg: Msg) -> (HarvestState, Vec<Effect>) {
    if state.is_done() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::RoundObserved {
            accepted_total,
            scroll,
        } => {
            state.begin_round();
            state.record_progress(accepted_total);
            state.apply_scroll(&scroll);

            let mut effects = Vec::with_capacity(2);
            if state.report_due() {
                effects.push(Effect::ReportProgress(state.view()));
            }
            match state.termination(&scroll) {
                Some(reason) => {
                    state.finish(reason);
                    effects.push(Effect::Finish { reason });
                }
                None => effects.push(Effect::Settle),
            }
            effects
        }
        Msg::TargetHintDetected(total) => {
            state.set_target_hint(total);
            Vec::new()
        }
        Msg::CancelRequested => {
            state.finish(CompletionReason::Cancelled);
            vec![Effect::Finish {
                reason: CompletionReason::Cancelled,
            }]
        }
    };

    (state, effects)
}
