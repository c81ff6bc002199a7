use harvester_core::{update, CompletionReason, HarvestState, Msg, Phase, ScrollReport};

#[test]
fn finished_state_ignores_further_messages() {
    let (state, _) = update(HarvestState::default(), Msg::CancelRequested);
    assert_eq!(state.phase(), Phase::Done(CompletionReason::Cancelled));

    let (next, effects) = update(
        state.clone(),
        Msg::RoundObserved {
            accepted_total: 10,
            scroll: ScrollReport::NoScroller,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(next, state);
}
