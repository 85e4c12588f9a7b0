// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::model::{StateKey, Workflow};

/// Suffix appended to the label of a fully connected state.
pub const FULLY_CONNECTED_MARK: &str = " ✓";

/// A selectable object in the rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagramObject {
    Node(StateKey),
    Edge { from: StateKey, to: StateKey },
}

impl fmt::Display for DiagramObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(key) => write!(f, "node:{key}"),
            Self::Edge { from, to } => write!(f, "edge:{from}->{to}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    key: StateKey,
    label: String,
    color: String,
    order: i64,
    fully_connected: bool,
    self_loop: bool,
}

impl DiagramNode {
    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn is_fully_connected(&self) -> bool {
        self.fully_connected
    }

    pub fn has_self_loop(&self) -> bool {
        self.self_loop
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEdge {
    from: StateKey,
    to: StateKey,
    label: String,
    /// Requested by the user but not yet part of the model.
    pending: bool,
}

impl DiagramEdge {
    pub fn from_key(&self) -> &StateKey {
        &self.from
    }

    pub fn to_key(&self) -> &StateKey {
        &self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn object(&self) -> DiagramObject {
        DiagramObject::Edge { from: self.from.clone(), to: self.to.clone() }
    }
}

/// Everything the layout and renderer need from a workflow, in fetched order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagramProjection {
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
}

impl DiagramProjection {
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DiagramEdge] {
        &self.edges
    }

    pub fn node(&self, key: &StateKey) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn has_edge(&self, from: &StateKey, to: &StateKey) -> bool {
        self.edges.iter().any(|e| &e.from == from && &e.to == to)
    }

    /// Adds a dashed candidate edge. Returns `false` for unknown endpoints or an existing pair.
    pub(crate) fn push_pending_edge(&mut self, from: &StateKey, to: &StateKey) -> bool {
        if self.has_edge(from, to) {
            return false;
        }
        let Some(target) = self.node(to) else {
            return false;
        };
        if self.node(from).is_none() {
            return false;
        }

        let label = target_label(target);
        self.edges.push(DiagramEdge { from: from.clone(), to: to.clone(), label, pending: true });
        true
    }

    #[cfg(test)]
    pub(crate) fn with_foreign_edges(mut self, other: &DiagramProjection) -> Self {
        self.edges.extend(other.edges.iter().cloned());
        self
    }
}

fn target_label(node: &DiagramNode) -> String {
    node.label
        .strip_suffix(FULLY_CONNECTED_MARK)
        .unwrap_or(&node.label)
        .to_owned()
}

pub fn project_workflow(workflow: &Workflow) -> DiagramProjection {
    let fully_connected = workflow.fully_connected_states();

    let nodes = workflow
        .states()
        .iter()
        .map(|state| {
            let is_full = fully_connected.contains(state.key());
            let label = if is_full {
                format!("{}{FULLY_CONNECTED_MARK}", state.name())
            } else {
                state.name().to_owned()
            };
            DiagramNode {
                key: state.key().clone(),
                label,
                color: state.color().to_owned(),
                order: state.order(),
                fully_connected: is_full,
                self_loop: workflow.has_transition(state.key(), state.key()),
            }
        })
        .collect();

    // Transitions to a state the workflow no longer lists have nowhere to be drawn.
    let edges = workflow
        .transitions()
        .iter()
        .filter(|t| workflow.contains_state(t.from_key()))
        .filter_map(|t| {
            let target = workflow.lookup_state(t.to_key())?;
            Some(DiagramEdge {
                from: t.from_key().clone(),
                to: t.to_key().clone(),
                label: target.name().to_owned(),
                pending: false,
            })
        })
        .collect();

    DiagramProjection { nodes, edges }
}
