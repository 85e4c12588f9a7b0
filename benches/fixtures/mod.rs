// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic workflow fixtures (no RNG).

use kanflow::model::{State, StateKey, Transition, Workflow, WorkflowId};

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// A typical five-column board.
    Small,
    /// Twelve states, each with a forward edge plus a couple of long jumps.
    Medium,
    /// Twenty-four states where every state reaches its next four neighbors and the first one.
    Dense,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::Dense];

    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::Dense => "dense",
        }
    }

    fn shape(self) -> (usize, usize) {
        match self {
            Case::Small => (5, 1),
            Case::Medium => (12, 3),
            Case::Dense => (24, 4),
        }
    }
}

pub fn state_key(idx: usize) -> StateKey {
    StateKey::new(format!("s{idx:02}")).expect("state key")
}

pub fn workflow(case: Case) -> Workflow {
    let (count, fan_out) = case.shape();
    let states = (0..count)
        .map(|idx| {
            State::new_with(
                state_key(idx),
                format!("Stage {idx}"),
                "status",
                "#3b82f6",
                idx as i64,
            )
        })
        .collect::<Vec<_>>();

    let mut transitions = Vec::new();
    for from in 0..count {
        for step in 1..=fan_out {
            let to = (from + step * step) % count;
            if to != from {
                transitions.push(Transition::new(state_key(from), state_key(to)));
            }
        }
        if matches!(case, Case::Dense) && from != 0 {
            transitions.push(Transition::new(state_key(from), state_key(0)));
        }
    }

    Workflow::new(
        WorkflowId::new(format!("wf-{}", case.id())).expect("workflow id"),
        case.id(),
        states,
        transitions,
    )
    .expect("workflow")
}

/// The full outgoing list for the middle state after one edge is swapped for another.
pub fn node_edit(workflow: &Workflow) -> (StateKey, Vec<Transition>) {
    let count = workflow.states().len();
    let node = state_key(count / 2);
    let mut updated = workflow.outgoing_transitions(&node);
    updated.pop();
    updated.push(Transition::new(node.clone(), state_key(count - 1)));
    (node, updated)
}
