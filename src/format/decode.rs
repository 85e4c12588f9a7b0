// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::{
    IdError, State, StateKey, Transition, Workflow, WorkflowError, WorkflowId,
    DEFAULT_STATE_CATEGORY, DEFAULT_STATE_COLOR,
};

use super::record::WorkflowRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    Workflow(WorkflowError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid id for {field}: {value:?}: {source}")
            }
            Self::Workflow(err) => write!(f, "malformed workflow: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            Self::Workflow(err) => Some(err),
        }
    }
}

impl From<WorkflowError> for DecodeError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

/// A record was coerced while decoding. The workflow is still usable.
///
/// Transitions pointing at states the record lacks are not coerced: they stay in the model and
/// surface as [`crate::model::IntegrityWarning`]s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// The pair appeared earlier in the list; the later copy was dropped.
    DuplicateTransition { from_key: String, to_key: String },
    /// The state had no order; its position in the list was used.
    MissingOrder { key: String, assigned: i64 },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTransition { from_key, to_key } => {
                write!(f, "dropped duplicate transition {from_key}->{to_key}")
            }
            Self::MissingOrder { key, assigned } => {
                write!(f, "state {key} has no order; using {assigned}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWorkflow {
    pub workflow: Workflow,
    pub warnings: Vec<DecodeWarning>,
}

fn parse_id<T: FromStr<Err = IdError>>(field: &'static str, value: &str) -> Result<T, DecodeError> {
    value.parse().map_err(|source| DecodeError::InvalidId {
        field,
        value: value.to_owned(),
        source,
    })
}

/// Builds the fixed-shape model from a fetched record.
///
/// Invalid identifiers and duplicate state keys reject the whole record. A transition repeating
/// an earlier pair is dropped with a warning. Orders stored on the wire are replaced by the
/// states' orders, except for an endpoint the record does not list: that side keeps its wire
/// value (or 0) as the last known order, and the transition itself is kept.
pub fn decode_workflow(record: &WorkflowRecord) -> Result<DecodedWorkflow, DecodeError> {
    let workflow_id: WorkflowId = parse_id("workflowId", &record.workflow_id)?;
    let mut warnings = Vec::new();

    let mut states = Vec::with_capacity(record.states.len());
    for (index, raw) in record.states.iter().enumerate() {
        let key: StateKey = parse_id("state.key", &raw.key)?;
        let order = match raw.order {
            Some(order) => order,
            None => {
                let assigned = i64::try_from(index).unwrap_or(i64::MAX);
                warnings.push(DecodeWarning::MissingOrder { key: raw.key.clone(), assigned });
                assigned
            }
        };
        let name = raw.name.clone().unwrap_or_else(|| raw.key.clone());
        states.push(State::new_with(
            key,
            name,
            raw.category.as_deref().unwrap_or(DEFAULT_STATE_CATEGORY),
            raw.color.as_deref().unwrap_or(DEFAULT_STATE_COLOR),
            order,
        ));
    }

    let mut seen = HashSet::<(&str, &str)>::new();
    let mut transitions = Vec::with_capacity(record.transitions.len());
    for raw in &record.transitions {
        if !seen.insert((raw.from_key.as_str(), raw.to_key.as_str())) {
            warnings.push(DecodeWarning::DuplicateTransition {
                from_key: raw.from_key.clone(),
                to_key: raw.to_key.clone(),
            });
            continue;
        }
        transitions.push(Transition::with_orders(
            parse_id("transition.fromKey", &raw.from_key)?,
            parse_id("transition.toKey", &raw.to_key)?,
            raw.from_order.unwrap_or_default(),
            raw.to_order.unwrap_or_default(),
        ));
    }

    let workflow = Workflow::new(workflow_id, record.name.clone(), states, transitions)?;
    Ok(DecodedWorkflow { workflow, warnings })
}
