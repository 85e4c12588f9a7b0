// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{StateKey, WorkflowId};
use super::state::State;
use super::transition::Transition;
use super::workflow::Workflow;

pub(crate) fn key(value: &str) -> StateKey {
    StateKey::new(value).expect("state key")
}

pub(crate) fn transition(from: &str, to: &str) -> Transition {
    Transition::new(key(from), key(to))
}

/// `todo(1) -> doing(2) -> done(3)`.
pub(crate) fn scenario_states() -> Vec<State> {
    vec![
        State::new(key("todo"), "To Do", 1),
        State::new(key("doing"), "In Progress", 2),
        State::new(key("done"), "Done", 3),
    ]
}

pub(crate) fn scenario_transitions() -> Vec<Transition> {
    vec![transition("todo", "doing"), transition("doing", "done")]
}

pub(crate) fn scenario_workflow() -> Workflow {
    Workflow::new(
        WorkflowId::new("wf-scenario").expect("workflow id"),
        "Scenario",
        scenario_states(),
        scenario_transitions(),
    )
    .expect("scenario workflow")
}

/// A five-column board with a backward edge and a self-loop.
pub(crate) fn kanban_workflow() -> Workflow {
    let states = vec![
        State::new_with(key("backlog"), "Backlog", "status", "#64748b", 0),
        State::new_with(key("todo"), "To Do", "status", "#3b82f6", 1),
        State::new_with(key("doing"), "In Progress", "status", "#f59e0b", 2),
        State::new_with(key("review"), "Review", "status", "#a855f7", 3),
        State::new_with(key("done"), "Done", "status", "#22c55e", 4),
    ];
    let transitions = vec![
        transition("backlog", "todo"),
        transition("todo", "doing"),
        transition("doing", "review"),
        transition("review", "done"),
        transition("review", "doing"),
        transition("todo", "done"),
        transition("review", "review"),
    ];

    Workflow::new(
        WorkflowId::new("wf-kanban").expect("workflow id"),
        "Kanban",
        states,
        transitions,
    )
    .expect("kanban workflow")
}
