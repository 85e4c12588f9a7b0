// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: workflow states, transitions and the graph operations over them.
//!
//! The model is pure data. It is mutated only through the session controller's merge step.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod graph;
pub mod ids;
#[cfg(test)]
mod property_tests;
pub mod scope;
pub mod state;
pub mod transition;
pub mod workflow;

pub use graph::{
    dedup_transitions, fully_connected_states, incoming_of, insert_transition, is_fully_connected,
    lookup_state, merge_node_transitions, outgoing_of, remove_transition, with_order_applied,
    IntegrityWarning, MissingEndpoint, OrderApplied,
};
pub use ids::{BoardId, IdError, StateKey, TeamId, WorkflowId};
pub use scope::{FetchKey, ParseFetchKeyError, Scope};
pub use state::{State, DEFAULT_STATE_CATEGORY, DEFAULT_STATE_COLOR};
pub use transition::Transition;
pub use workflow::{Workflow, WorkflowError};
