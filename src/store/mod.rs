// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Backends that answer the fetch and persist contracts.
//!
//! [`WorkflowFolder`] keeps records as JSON files on disk and is what the binary uses by default.
//! [`MemoryBackend`] keeps them in memory, can be told to fail, and seeds the demo board.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::model::{FetchKey, IdError, WorkflowId};

pub mod folder;
pub mod memory;

pub use folder::{WorkflowFolder, WriteDurability};
pub use memory::{MemoryBackend, DEMO_BOARD_ID};

#[derive(Debug)]
pub enum BackendError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    SymlinkRefused {
        path: PathBuf,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },
    ScopeNotFound {
        key: FetchKey,
    },
    WorkflowNotFound {
        workflow_id: WorkflowId,
    },
    /// The backend answered but refused the request.
    Rejected {
        reason: String,
    },
    /// The blocking worker went away before it answered.
    Interrupted {
        message: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
            Self::InvalidId { field, value, source } => {
                write!(f, "invalid id for {field}: {value:?}: {source}")
            }
            Self::ScopeNotFound { key } => write!(f, "no workflow is bound to {key}"),
            Self::WorkflowNotFound { workflow_id } => {
                write!(f, "workflow not found (workflow_id={workflow_id})")
            }
            Self::Rejected { reason } => write!(f, "backend rejected the request: {reason}"),
            Self::Interrupted { message } => write!(f, "backend worker interrupted: {message}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::SymlinkRefused { .. }
            | Self::ScopeNotFound { .. }
            | Self::WorkflowNotFound { .. }
            | Self::Rejected { .. }
            | Self::Interrupted { .. } => None,
        }
    }
}

impl From<tokio::task::JoinError> for BackendError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Interrupted { message: value.to_string() }
    }
}
