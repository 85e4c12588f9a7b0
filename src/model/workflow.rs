// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::graph::{self, IntegrityWarning};
use super::ids::{StateKey, WorkflowId};
use super::state::State;
use super::transition::Transition;

/// One workflow: an ordered state list plus the transition set between those states.
///
/// A `Workflow` is always complete. There is no way to build one with states but without
/// transitions, and construction refuses duplicate state keys. A transition may still name a
/// state the list lacks (the backend deleted it); such a transition is kept with its last-known
/// orders so a full-replacement save never erases it, and is reported by
/// [`Workflow::integrity_warnings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    workflow_id: WorkflowId,
    name: String,
    states: Vec<State>,
    transitions: Vec<Transition>,
    rev: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    DuplicateStateKey { key: StateKey },
    UnknownState { key: StateKey },
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateStateKey { key } => write!(f, "duplicate state key {key}"),
            Self::UnknownState { key } => write!(f, "state not found (key={key})"),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl Workflow {
    /// Builds a workflow, deduplicating transitions and deriving their orders.
    pub fn new(
        workflow_id: WorkflowId,
        name: impl Into<String>,
        states: Vec<State>,
        transitions: Vec<Transition>,
    ) -> Result<Self, WorkflowError> {
        let mut seen = HashSet::with_capacity(states.len());
        for state in &states {
            if !seen.insert(state.key()) {
                return Err(WorkflowError::DuplicateStateKey { key: state.key().clone() });
            }
        }

        let transitions = graph::with_order_applied(
            &graph::dedup_transitions(transitions),
            &states,
        )
        .transitions;

        Ok(Self {
            workflow_id,
            name: name.into(),
            states,
            transitions,
            rev: 0,
        })
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Local edit counter. Bumped once per merged edit; never sent to a backend.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn lookup_state(&self, key: &StateKey) -> Option<&State> {
        graph::lookup_state(&self.states, key)
    }

    pub fn contains_state(&self, key: &StateKey) -> bool {
        self.lookup_state(key).is_some()
    }

    pub fn outgoing_of(&self, key: &StateKey) -> BTreeSet<StateKey> {
        graph::outgoing_of(&self.transitions, key)
    }

    pub fn incoming_of(&self, key: &StateKey) -> BTreeSet<StateKey> {
        graph::incoming_of(&self.transitions, key)
    }

    /// The transitions whose source is `key`, in set order.
    pub fn outgoing_transitions(&self, key: &StateKey) -> Vec<Transition> {
        self.transitions
            .iter()
            .filter(|t| t.from_key() == key)
            .cloned()
            .collect()
    }

    pub fn has_transition(&self, from_key: &StateKey, to_key: &StateKey) -> bool {
        self.transitions.iter().any(|t| t.connects(from_key, to_key))
    }

    pub fn is_fully_connected(&self, key: &StateKey) -> bool {
        graph::is_fully_connected(&self.states, &self.transitions, key)
    }

    pub fn fully_connected_states(&self) -> BTreeSet<StateKey> {
        graph::fully_connected_states(&self.states, &self.transitions)
    }

    /// One warning per transition whose source or target is not in the state list.
    pub fn integrity_warnings(&self) -> Vec<IntegrityWarning> {
        graph::with_order_applied(&self.transitions, &self.states).warnings
    }

    /// Whether every state is fully connected (the transition set is a complete digraph).
    pub fn is_complete(&self) -> bool {
        !self.states.is_empty() && self.fully_connected_states().len() == self.states.len()
    }

    /// Changes a state's order and re-derives every transition's order copies.
    pub fn set_state_order(
        &mut self,
        key: &StateKey,
        order: i64,
    ) -> Result<Vec<IntegrityWarning>, WorkflowError> {
        let Some(state) = self.states.iter_mut().find(|s| s.key() == key) else {
            return Err(WorkflowError::UnknownState { key: key.clone() });
        };
        state.set_order(order);

        let applied = graph::with_order_applied(&self.transitions, &self.states);
        self.transitions = applied.transitions;
        Ok(applied.warnings)
    }

    /// Swaps in a merged transition set. Callers have already applied orders.
    pub(crate) fn replace_transitions(&mut self, transitions: Vec<Transition>) {
        self.transitions = transitions;
    }

    pub(crate) fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}
