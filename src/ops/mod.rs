// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Transition editing for a single state.
//!
//! A [`TransitionPanel`] holds a working copy of one state's outgoing transitions. It reads the
//! workflow for lookups but never writes to it: on save the panel hands a [`NodeEdit`] to the
//! session controller, which performs the merge.

use std::fmt;

use crate::model::{self, StateKey, Transition, Workflow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOp {
    Add { to_key: StateKey },
    Remove { to_key: StateKey },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Adding a present transition or removing an absent one.
    Unchanged,
}

/// Which target keys changed as the result of a batch of panel ops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelDelta {
    pub added: Vec<StateKey>,
    pub removed: Vec<StateKey>,
}

impl PanelDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn record_added(&mut self, key: &StateKey) {
        if let Some(index) = self.removed.iter().position(|k| k == key) {
            self.removed.remove(index);
            return;
        }
        self.added.push(key.clone());
    }

    fn record_removed(&mut self, key: &StateKey) {
        if let Some(index) = self.added.iter().position(|k| k == key) {
            self.added.remove(index);
            return;
        }
        self.removed.push(key.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    StateNotFound { key: StateKey },
    ForeignSource { node_key: StateKey, from_key: StateKey },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateNotFound { key } => write!(f, "state not found (key={key})"),
            Self::ForeignSource { node_key, from_key } => write!(
                f,
                "transition source {from_key} does not belong to the edited state {node_key}"
            ),
        }
    }
}

impl std::error::Error for EditError {}

/// The complete outgoing transition list of one state, ready to be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEdit {
    pub node_key: StateKey,
    pub base_rev: u64,
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPanel {
    node_key: StateKey,
    base_rev: u64,
    outgoing: Vec<Transition>,
    dirty: bool,
}

impl TransitionPanel {
    pub fn open(workflow: &Workflow, node_key: &StateKey) -> Result<Self, EditError> {
        if !workflow.contains_state(node_key) {
            return Err(EditError::StateNotFound { key: node_key.clone() });
        }

        Ok(Self {
            node_key: node_key.clone(),
            base_rev: workflow.rev(),
            outgoing: workflow.outgoing_transitions(node_key),
            dirty: false,
        })
    }

    pub fn node_key(&self) -> &StateKey {
        &self.node_key
    }

    /// The workflow revision the panel was opened at.
    pub fn base_rev(&self) -> u64 {
        self.base_rev
    }

    pub fn outgoing(&self) -> &[Transition] {
        &self.outgoing
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn targets(&self, to_key: &StateKey) -> bool {
        self.outgoing.iter().any(|t| t.to_key() == to_key)
    }

    pub fn add_transition(
        &mut self,
        workflow: &Workflow,
        from_key: &StateKey,
        to_key: &StateKey,
    ) -> Result<EditOutcome, EditError> {
        let transition = self.resolve(workflow, from_key, to_key)?;
        if !model::insert_transition(&mut self.outgoing, transition) {
            return Ok(EditOutcome::Unchanged);
        }
        self.dirty = true;
        Ok(EditOutcome::Applied)
    }

    pub fn remove_transition(&mut self, from_key: &StateKey, to_key: &StateKey) -> EditOutcome {
        if from_key != &self.node_key
            || !model::remove_transition(&mut self.outgoing, from_key, to_key)
        {
            return EditOutcome::Unchanged;
        }
        self.dirty = true;
        EditOutcome::Applied
    }

    /// Adds the transition to `to_key` if absent, removes it otherwise.
    pub fn toggle(&mut self, workflow: &Workflow, to_key: &StateKey) -> Result<EditOutcome, EditError> {
        let node_key = self.node_key.clone();
        if self.targets(to_key) {
            return Ok(self.remove_transition(&node_key, to_key));
        }
        self.add_transition(workflow, &node_key, to_key)
    }

    /// Applies a batch of ops. Either every op is applied or the panel is left unchanged.
    pub fn apply(&mut self, workflow: &Workflow, ops: &[PanelOp]) -> Result<PanelDelta, EditError> {
        let mut working = self.clone();
        let mut delta = PanelDelta::default();
        let node_key = self.node_key.clone();

        for op in ops {
            match op {
                PanelOp::Add { to_key } => {
                    if working.add_transition(workflow, &node_key, to_key)? == EditOutcome::Applied {
                        delta.record_added(to_key);
                    }
                }
                PanelOp::Remove { to_key } => {
                    if working.remove_transition(&node_key, to_key) == EditOutcome::Applied {
                        delta.record_removed(to_key);
                    }
                }
            }
        }

        *self = working;
        Ok(delta)
    }

    /// Re-reads the node's transitions, dropping local changes.
    pub fn reset(&mut self, workflow: &Workflow) -> Result<(), EditError> {
        *self = Self::open(workflow, &self.node_key)?;
        Ok(())
    }

    pub fn node_edit(&self) -> NodeEdit {
        NodeEdit {
            node_key: self.node_key.clone(),
            base_rev: self.base_rev,
            transitions: self.outgoing.clone(),
        }
    }

    fn resolve(
        &self,
        workflow: &Workflow,
        from_key: &StateKey,
        to_key: &StateKey,
    ) -> Result<Transition, EditError> {
        let Some(from) = workflow.lookup_state(from_key) else {
            return Err(EditError::StateNotFound { key: from_key.clone() });
        };
        let Some(to) = workflow.lookup_state(to_key) else {
            return Err(EditError::StateNotFound { key: to_key.clone() });
        };
        if from_key != &self.node_key {
            return Err(EditError::ForeignSource {
                node_key: self.node_key.clone(),
                from_key: from_key.clone(),
            });
        }
        Ok(Transition::between(from, to))
    }
}
