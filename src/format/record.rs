// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use crate::model::{Transition, Workflow};

/// Name sent with every transition update.
pub const PERSIST_UPDATE_NAME: &str = "workflow update";

/// A workflow as returned by the fetch contract.
///
/// Fields other than the identifiers are optional on the wire; [`super::decode_workflow`] fills
/// the gaps when building the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub workflow_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateRecord>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    pub from_key: String,
    pub to_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_order: Option<i64>,
}

impl From<&Transition> for TransitionRecord {
    fn from(t: &Transition) -> Self {
        Self {
            from_key: t.from_key().to_string(),
            to_key: t.to_key().to_string(),
            from_order: Some(t.from_order()),
            to_order: Some(t.to_order()),
        }
    }
}

/// Body of the persist contract: a full replacement of the workflow's transition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistPayload {
    pub name: String,
    pub transitions: Vec<TransitionRecord>,
}

impl PersistPayload {
    pub fn transition_update(transitions: &[Transition]) -> Self {
        Self {
            name: PERSIST_UPDATE_NAME.to_owned(),
            transitions: transitions.iter().map(TransitionRecord::from).collect(),
        }
    }
}

impl WorkflowRecord {
    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self {
            workflow_id: workflow.workflow_id().to_string(),
            name: workflow.name().to_owned(),
            states: workflow
                .states()
                .iter()
                .map(|s| StateRecord {
                    key: s.key().to_string(),
                    name: Some(s.name().to_owned()),
                    color: Some(s.color().to_owned()),
                    order: Some(s.order()),
                    category: Some(s.category().to_owned()),
                })
                .collect(),
            transitions: workflow.transitions().iter().map(TransitionRecord::from).collect(),
        }
    }

    /// Replaces the transition set with the persisted one. States are never touched.
    pub fn apply_persist(&mut self, payload: &PersistPayload) {
        self.transitions = payload.transitions.clone();
    }
}
