// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::diagram::DiagramError;
use crate::format::{DecodeError, DecodeWarning};
use crate::model::{IntegrityWarning, WorkflowError};
use crate::ops::EditError;
use crate::store::BackendError;

#[derive(Debug)]
pub enum SessionError {
    /// The call needs a loaded workflow.
    NotLoaded,
    NoPanel,
    StalePanel {
        base_rev: u64,
        current_rev: u64,
    },
    Backend(BackendError),
    Decode(DecodeError),
    Diagram(DiagramError),
    Edit(EditError),
    Workflow(WorkflowError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => f.write_str("no workflow is loaded"),
            Self::NoPanel => f.write_str("no transition panel is open"),
            Self::StalePanel { base_rev, current_rev } => write!(
                f,
                "transition panel is stale (opened at rev {base_rev}, workflow is at rev {current_rev})"
            ),
            Self::Backend(err) => write!(f, "backend error: {err}"),
            Self::Decode(err) => write!(f, "cannot decode workflow: {err}"),
            Self::Diagram(err) => write!(f, "diagram error: {err}"),
            Self::Edit(err) => write!(f, "edit rejected: {err}"),
            Self::Workflow(err) => write!(f, "workflow error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotLoaded | Self::NoPanel | Self::StalePanel { .. } => None,
            Self::Backend(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Diagram(err) => Some(err),
            Self::Edit(err) => Some(err),
            Self::Workflow(err) => Some(err),
        }
    }
}

impl From<BackendError> for SessionError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<DecodeError> for SessionError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<DiagramError> for SessionError {
    fn from(value: DiagramError) -> Self {
        Self::Diagram(value)
    }
}

impl From<EditError> for SessionError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

impl From<WorkflowError> for SessionError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

/// Something the user should know about that did not stop the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionWarning {
    Decode(DecodeWarning),
    Integrity(IntegrityWarning),
    /// The last persist failed; the local transition set is ahead of the remote one.
    PersistFailed { message: String },
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(warning) => write!(f, "{warning}"),
            Self::Integrity(warning) => write!(f, "{warning}"),
            Self::PersistFailed { message } => {
                write!(f, "save failed, remote copy may be stale: {message}")
            }
        }
    }
}
