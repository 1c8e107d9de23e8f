mod common;

use std::collections::HashSet;

use beatbox_chart::MoveKind;
use beatbox_play::InputAction;
use common::{Harness, chart};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Advance(u32),
    Press(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1u32..400).prop_map(Step::Advance),
        (0usize..InputAction::ALL.len()).prop_map(Step::Press),
    ]
}

fn kind(k: u8) -> MoveKind {
    match k {
        0 => MoveKind::Jab,
        1 => MoveKind::Punch,
        _ => MoveKind::Hook,
    }
}

proptest! {
    #[test]
    fn counters_stay_within_chart(
        mut moves in prop::collection::vec((0u32..8_000, 0u8..3, 0u8..3), 0..40),
        steps in prop::collection::vec(step(), 0..200),
    ) {
        moves.sort_by_key(|m| m.0);
        let triples: Vec<(f64, u8, MoveKind)> =
            moves.iter().map(|&(ms, lane, k)| (ms as f64, lane, kind(k))).collect();
        let total = triples.len() as u32;
        let mut h = Harness::running(chart(&triples));
        let mut now = 0.0;

        for s in &steps {
            match s {
                Step::Advance(ms) => {
                    now += *ms as f64;
                    h.tick_at(now);
                }
                Step::Press(i) => {
                    h.engine.handle_action(InputAction::ALL[*i]);
                }
            }
            let board = h.engine.scoreboard();
            prop_assert!(board.resolved_notes() <= total);
            let accuracy = h.engine.accuracy();
            prop_assert!((0.0..=100.0).contains(&accuracy));
        }

        // Run past the last note so everything auto-resolves.
        h.tick_at(now + 10_000.0);
        prop_assert_eq!(h.engine.scoreboard().resolved_notes(), total);
        if total == 0 {
            prop_assert_eq!(h.engine.accuracy(), 100.0);
        }

        let mut seen = HashSet::new();
        for result in h.results.borrow().iter() {
            if let Some(note) = &result.note {
                prop_assert!(seen.insert(note.id), "note {} resolved twice", note.id);
            }
        }
        prop_assert_eq!(seen.len() as u32, total);
    }
}
