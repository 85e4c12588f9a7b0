// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use proptest::prelude::*;

use super::graph::{
    dedup_transitions, insert_transition, lookup_state, merge_node_transitions,
    with_order_applied,
};
use super::{State, StateKey, Transition};

fn state_key(index: usize) -> StateKey {
    StateKey::new(format!("s{index}")).expect("state key")
}

fn states_strategy() -> impl Strategy<Value = Vec<State>> {
    prop::collection::vec(-50i64..50, 2..7).prop_map(|orders| {
        orders
            .into_iter()
            .enumerate()
            .map(|(index, order)| State::new(state_key(index), format!("S{index}"), order))
            .collect()
    })
}

fn pairs_strategy(max_len: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..7, 0usize..7), 0..max_len)
}

/// States plus a duplicate-free transition set over them.
fn graph_strategy() -> impl Strategy<Value = (Vec<State>, Vec<Transition>)> {
    states_strategy().prop_flat_map(|states| {
        let n = states.len();
        (Just(states), pairs_strategy(24)).prop_map(move |(states, pairs)| {
            let transitions = pairs
                .into_iter()
                .map(|(from, to)| Transition::new(state_key(from % n), state_key(to % n)))
                .collect::<Vec<_>>();
            let transitions = with_order_applied(&dedup_transitions(transitions), &states);
            (states, transitions.transitions)
        })
    })
}

proptest! {
    #[test]
    fn empty_update_removes_exactly_the_node_outgoing((states, transitions) in graph_strategy(), node in 0usize..7) {
        let node_key = state_key(node % states.len());
        let merged = merge_node_transitions(&transitions, &[], &node_key);

        let expected = transitions
            .iter()
            .filter(|t| t.from_key() != &node_key)
            .cloned()
            .collect::<Vec<_>>();
        prop_assert_eq!(merged, expected);
    }

    #[test]
    fn merge_leaves_other_sources_untouched(
        (states, transitions) in graph_strategy(),
        node in 0usize..7,
        targets in prop::collection::vec(0usize..7, 0..6),
    ) {
        let n = states.len();
        let node_key = state_key(node % n);
        let updated = targets
            .into_iter()
            .map(|to| Transition::new(node_key.clone(), state_key(to % n)))
            .collect::<Vec<_>>();

        let merged = merge_node_transitions(&transitions, &updated, &node_key);

        let others_before = transitions.iter().filter(|t| t.from_key() != &node_key).collect::<Vec<_>>();
        let others_after = merged.iter().filter(|t| t.from_key() != &node_key).collect::<Vec<_>>();
        prop_assert_eq!(others_before, others_after);

        let node_after = merged.iter().filter(|t| t.from_key() == &node_key).count();
        let distinct_updates = dedup_transitions(updated).len();
        prop_assert_eq!(node_after, distinct_updates);
    }

    #[test]
    fn merge_is_idempotent(
        (states, transitions) in graph_strategy(),
        node in 0usize..7,
        targets in prop::collection::vec(0usize..7, 0..6),
    ) {
        let n = states.len();
        let node_key = state_key(node % n);
        let updated = targets
            .into_iter()
            .map(|to| Transition::new(node_key.clone(), state_key(to % n)))
            .collect::<Vec<_>>();

        let once = merge_node_transitions(&transitions, &updated, &node_key);
        let twice = merge_node_transitions(&once, &updated, &node_key);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn order_application_matches_state_orders((states, transitions) in graph_strategy(), shuffled in prop::collection::vec(-50i64..50, 7)) {
        let reordered = states
            .iter()
            .enumerate()
            .map(|(index, s)| State::new(s.key().clone(), s.name(), shuffled[index]))
            .collect::<Vec<_>>();

        let applied = with_order_applied(&transitions, &reordered);
        prop_assert!(applied.warnings.is_empty());
        for t in &applied.transitions {
            prop_assert_eq!(t.from_order(), lookup_state(&reordered, t.from_key()).unwrap().order());
            prop_assert_eq!(t.to_order(), lookup_state(&reordered, t.to_key()).unwrap().order());
        }
    }

    #[test]
    fn adding_the_same_pair_twice_grows_the_set_by_one((states, mut transitions) in graph_strategy(), from in 0usize..7, to in 0usize..7) {
        let n = states.len();
        let (from_key, to_key) = (state_key(from % n), state_key(to % n));
        prop_assume!(!transitions.iter().any(|t| t.connects(&from_key, &to_key)));

        let before = transitions.len();
        prop_assert!(insert_transition(&mut transitions, Transition::new(from_key.clone(), to_key.clone())));
        prop_assert!(!insert_transition(&mut transitions, Transition::new(from_key, to_key)));
        prop_assert_eq!(transitions.len(), before + 1);
    }
}
