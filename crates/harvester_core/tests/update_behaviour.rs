use std::sync::Once;

use harvester_core::{
    update, CompletionReason, Effect, HarvestPolicy, HarvestState, Msg, Phase, ScrollPosition,
    ScrollReport, StallPolicy, SAFETY_CEILING,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn advanced(previous: f64, now: f64, max: f64) -> ScrollReport {
    ScrollReport::Advanced(ScrollPosition::new(previous, now, max))
}

fn observe(state: HarvestState, accepted_total: usize, scroll: ScrollReport) -> (HarvestState, Vec<Effect>) {
    update(
        state,
        Msg::RoundObserved {
            accepted_total,
            scroll,
        },
    )
}

fn finish_reason(effects: &[Effect]) -> Option<CompletionReason> {
    effects.iter().find_map(|effect| match effect {
        Effect::Finish { reason } => Some(*reason),
        _ => None,
    })
}

#[test]
fn growth_resets_counter_and_stagnation_increments_it() {
    init_logging();
    let state = HarvestState::default();

    let (state, effects) = observe(state, 4, advanced(0.0, 100.0, 800.0));
    assert_eq!(state.round_index(), 1);
    assert_eq!(state.last_accepted_count(), 4);
    assert_eq!(state.consecutive_no_progress_rounds(), 0);
    assert_eq!(effects, vec![Effect::Settle]);

    let (state, _) = observe(state, 4, advanced(100.0, 200.0, 800.0));
    let (state, _) = observe(state, 4, advanced(200.0, 300.0, 800.0));
    assert_eq!(state.consecutive_no_progress_rounds(), 2);

    let (state, _) = observe(state, 9, advanced(300.0, 400.0, 800.0));
    assert_eq!(state.consecutive_no_progress_rounds(), 0);
    assert_eq!(state.last_accepted_count(), 9);
}

#[test]
fn exhausts_within_threshold_rounds_after_last_growth() {
    init_logging();
    let mut state = HarvestState::default();
    // Rows stop growing after round 3, which is also when the bottom is hit.
    let rounds = [
        (4, advanced(0.0, 400.0, 800.0)),
        (8, advanced(400.0, 800.0, 800.0)),
        (12, advanced(800.0, 800.0, 800.0)),
    ];
    for (total, scroll) in rounds {
        let (next, effects) = observe(state, total, scroll);
        assert_eq!(effects, vec![Effect::Settle]);
        state = next;
    }

    let mut finished_at = None;
    for _ in 0..10 {
        let (next, effects) = observe(state, 12, advanced(800.0, 800.0, 800.0));
        state = next;
        if let Some(reason) = finish_reason(&effects) {
            assert_eq!(reason, CompletionReason::Exhausted);
            finished_at = Some(state.round_index());
            break;
        }
    }

    assert_eq!(finished_at, Some(8));
    assert_eq!(state.phase(), Phase::Done(CompletionReason::Exhausted));
}

#[test]
fn empty_table_without_scroller_exhausts_quickly() {
    init_logging();
    let mut state = HarvestState::default();
    let mut rounds = 0;
    loop {
        let (next, effects) = observe(state, 0, ScrollReport::NoScroller);
        state = next;
        rounds += 1;
        if let Some(reason) = finish_reason(&effects) {
            assert_eq!(reason, CompletionReason::Exhausted);
            break;
        }
        assert!(rounds < 6, "should have exhausted by round 6");
    }
    assert!(rounds <= 6);
}

#[test]
fn not_at_bottom_never_exhausts() {
    init_logging();
    let mut state = HarvestState::default();
    for round in 1..=50u32 {
        let (next, effects) = observe(state, 3, advanced(f64::from(round), f64::from(round) + 1.0, 1e9));
        state = next;
        assert_eq!(finish_reason(&effects), None);
    }
    assert_eq!(state.consecutive_no_progress_rounds(), 49);
}

#[test]
fn safety_ceiling_fires_at_exact_round() {
    init_logging();
    let mut state = HarvestState::default();
    let mut total = 0;
    loop {
        total += 1;
        let position = total as f64;
        let (next, effects) = observe(state, total, advanced(position - 1.0, position, position + 10.0));
        state = next;
        if let Some(reason) = finish_reason(&effects) {
            assert_eq!(reason, CompletionReason::SafetyCeilingReached);
            break;
        }
    }
    assert_eq!(state.round_index(), SAFETY_CEILING);
}

#[test]
fn exhaustion_wins_over_ceiling_on_the_same_round() {
    init_logging();
    let policy = HarvestPolicy {
        safety_ceiling: 5,
        ..HarvestPolicy::default()
    };
    let mut state = HarvestState::new(policy);
    let mut last = Vec::new();
    for _ in 0..5 {
        let (next, effects) = observe(state, 0, ScrollReport::NoScroller);
        state = next;
        last = effects;
    }
    assert_eq!(finish_reason(&last), Some(CompletionReason::Exhausted));
}

#[test]
fn stall_policy_reset_restarts_the_counter() {
    init_logging();
    let reset = HarvestPolicy {
        stall_policy: StallPolicy::Reset,
        ..HarvestPolicy::default()
    };
    let continuing = HarvestPolicy::default();

    let run = |policy: HarvestPolicy| {
        let mut state = HarvestState::new(policy);
        for _ in 0..3 {
            state = observe(state, 2, advanced(0.0, 100.0, 500.0)).0;
        }
        // A transient stall mid-page.
        observe(state, 2, ScrollReport::Skipped).0
    };

    assert_eq!(run(reset).consecutive_no_progress_rounds(), 0);
    assert_eq!(run(continuing).consecutive_no_progress_rounds(), 3);
}

#[test]
fn progress_is_reported_on_interval_with_percent() {
    init_logging();
    let policy = HarvestPolicy {
        progress_interval: 2,
        ..HarvestPolicy::default()
    };
    let state = HarvestState::new(policy).with_target_hint(Some(40));
    let (state, effects) = observe(state, 5, advanced(0.0, 1.0, 10.0));
    assert_eq!(effects, vec![Effect::Settle]);

    let (_, effects) = observe(state, 10, advanced(1.0, 2.0, 10.0));
    match &effects[0] {
        Effect::ReportProgress(view) => {
            assert_eq!(view.round, 2);
            assert_eq!(view.accepted, 10);
            assert_eq!(view.percent, Some(25.0));
        }
        other => panic!("expected progress report, got {other:?}"),
    }
    assert_eq!(effects[1], Effect::Settle);
}

#[test]
fn hint_message_ignores_zero() {
    init_logging();
    let (state, _) = update(HarvestState::default(), Msg::TargetHintDetected(0));
    assert_eq!(state.target_count_hint(), None);
    let (state, effects) = update(state, Msg::TargetHintDetected(2849));
    assert_eq!(state.target_count_hint(), Some(2849));
    assert!(effects.is_empty());
}
