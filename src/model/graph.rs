// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pure queries and merge primitives over a state list and a transition list.
//!
//! Nothing here performs I/O or logs; callers decide how to surface [`IntegrityWarning`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use super::ids::StateKey;
use super::state::State;
use super::transition::Transition;

pub fn lookup_state<'a>(states: &'a [State], key: &StateKey) -> Option<&'a State> {
    states.iter().find(|state| state.key() == key)
}

/// Target keys of every transition leaving `key`.
pub fn outgoing_of(transitions: &[Transition], key: &StateKey) -> BTreeSet<StateKey> {
    transitions
        .iter()
        .filter(|t| t.from_key() == key)
        .map(|t| t.to_key().clone())
        .collect()
}

/// Source keys of every transition entering `key`.
pub fn incoming_of(transitions: &[Transition], key: &StateKey) -> BTreeSet<StateKey> {
    transitions
        .iter()
        .filter(|t| t.to_key() == key)
        .map(|t| t.from_key().clone())
        .collect()
}

/// Whether `key` has both an outgoing and an incoming transition for every *other* state.
///
/// Self-loops do not count. A key that is not in `states` is never fully connected.
pub fn is_fully_connected(states: &[State], transitions: &[Transition], key: &StateKey) -> bool {
    if lookup_state(states, key).is_none() {
        return false;
    }

    let outgoing = outgoing_of(transitions, key);
    let incoming = incoming_of(transitions, key);
    states
        .iter()
        .map(State::key)
        .filter(|other| *other != key)
        .all(|other| outgoing.contains(other) && incoming.contains(other))
}

/// All fully connected states, computed in a single pass over the transitions.
pub fn fully_connected_states(states: &[State], transitions: &[Transition]) -> BTreeSet<StateKey> {
    let known = states.iter().map(State::key).collect::<HashSet<_>>();
    let mut outgoing = BTreeMap::<&StateKey, HashSet<&StateKey>>::new();
    let mut incoming = BTreeMap::<&StateKey, HashSet<&StateKey>>::new();

    for transition in transitions {
        let (from, to) = transition.pair();
        if from == to || !known.contains(from) || !known.contains(to) {
            continue;
        }
        outgoing.entry(from).or_default().insert(to);
        incoming.entry(to).or_default().insert(from);
    }

    let others = known.len().saturating_sub(1);
    states
        .iter()
        .map(State::key)
        .filter(|key| {
            let out = outgoing.get(key).map_or(0, HashSet::len);
            let inc = incoming.get(key).map_or(0, HashSet::len);
            out == others && inc == others
        })
        .cloned()
        .collect()
}

/// Which endpoint of a transition could not be resolved against the state list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEndpoint {
    From,
    To,
    Both,
}

/// A transition references a state that is not part of the workflow.
///
/// Not fatal: the transition is kept with its last-known order for the missing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityWarning {
    pub from_key: StateKey,
    pub to_key: StateKey,
    pub missing: MissingEndpoint,
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = match self.missing {
            MissingEndpoint::From => "source state",
            MissingEndpoint::To => "target state",
            MissingEndpoint::Both => "source and target states",
        };
        write!(f, "transition {} -> {} references a missing {missing}", self.from_key, self.to_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderApplied {
    pub transitions: Vec<Transition>,
    pub warnings: Vec<IntegrityWarning>,
}

/// Rewrites `from_order`/`to_order` of every transition from the current state orders.
pub fn with_order_applied(transitions: &[Transition], states: &[State]) -> OrderApplied {
    let orders = states.iter().map(|s| (s.key(), s.order())).collect::<HashMap<_, _>>();

    let mut applied = OrderApplied {
        transitions: Vec::with_capacity(transitions.len()),
        warnings: Vec::new(),
    };

    for transition in transitions {
        let from_order = orders.get(transition.from_key()).copied();
        let to_order = orders.get(transition.to_key()).copied();

        let missing = match (from_order, to_order) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(MissingEndpoint::From),
            (Some(_), None) => Some(MissingEndpoint::To),
            (None, None) => Some(MissingEndpoint::Both),
        };
        if let Some(missing) = missing {
            applied.warnings.push(IntegrityWarning {
                from_key: transition.from_key().clone(),
                to_key: transition.to_key().clone(),
                missing,
            });
        }

        let mut updated = transition.clone();
        updated.set_orders(
            from_order.unwrap_or(transition.from_order()),
            to_order.unwrap_or(transition.to_order()),
        );
        applied.transitions.push(updated);
    }

    applied
}

/// Drops every transition whose `(from_key, to_key)` pair was already seen. First one wins.
pub fn dedup_transitions(transitions: Vec<Transition>) -> Vec<Transition> {
    let mut seen = HashSet::<(StateKey, StateKey)>::with_capacity(transitions.len());
    transitions
        .into_iter()
        .filter(|t| seen.insert((t.from_key().clone(), t.to_key().clone())))
        .collect()
}

/// Inserts with set semantics. Returns `false` when the pair is already present.
pub fn insert_transition(transitions: &mut Vec<Transition>, transition: Transition) -> bool {
    if transitions
        .iter()
        .any(|t| t.connects(transition.from_key(), transition.to_key()))
    {
        return false;
    }
    transitions.push(transition);
    true
}

/// Removes the transition for the pair. Returns `false` when there was none.
pub fn remove_transition(
    transitions: &mut Vec<Transition>,
    from_key: &StateKey,
    to_key: &StateKey,
) -> bool {
    let before = transitions.len();
    transitions.retain(|t| !t.connects(from_key, to_key));
    transitions.len() != before
}

/// Replaces the outgoing transitions of `node_key` with `updated_for_node`.
///
/// Every transition of another source is kept in place and untouched. Kept transitions of the
/// node keep their position (taking the updated value), new ones are appended in update order.
/// Entries of `updated_for_node` with a different source are ignored. The result is deduplicated
/// on the `(from_key, to_key)` pair, and the operation is idempotent.
pub fn merge_node_transitions(
    existing: &[Transition],
    updated_for_node: &[Transition],
    node_key: &StateKey,
) -> Vec<Transition> {
    let updated = updated_for_node
        .iter()
        .filter(|t| t.from_key() == node_key)
        .collect::<Vec<_>>();

    let mut merged = Vec::with_capacity(existing.len() + updated.len());
    for transition in existing {
        if transition.from_key() != node_key {
            merged.push(transition.clone());
            continue;
        }
        if let Some(replacement) = updated.iter().find(|u| u.to_key() == transition.to_key()) {
            merged.push((*replacement).clone());
        }
    }
    merged.extend(updated.into_iter().cloned());

    dedup_transitions(merged)
}
