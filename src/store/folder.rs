// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::format::{PersistPayload, WorkflowRecord};
use crate::model::{FetchKey, WorkflowId};
use crate::session::WorkflowBackend;

use super::BackendError;

mod io_util;

use io_util::{encode_file_segment, read_json, write_atomic};

const SCOPES_FILENAME: &str = "scopes.json";
const WORKFLOWS_DIRNAME: &str = "workflows";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Flushes file contents and the rename to stable storage where the platform allows it.
    Durable,
}

/// Maps fetch keys (`board:<id>` / `team:<id>`) to workflow ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ScopeIndexJson {
    #[serde(default)]
    scopes: BTreeMap<String, String>,
}

/// A directory of workflow records.
///
/// ```text
/// <root>/scopes.json             fetch key -> workflow id
/// <root>/workflows/<id>.json     one WorkflowRecord per workflow
/// ```
///
/// Every write goes through a temp file and a rename, so readers never see half a record.
#[derive(Debug, Clone)]
pub struct WorkflowFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl WorkflowFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scopes_path(&self) -> PathBuf {
        self.root.join(SCOPES_FILENAME)
    }

    pub fn workflow_path(&self, workflow_id: &WorkflowId) -> PathBuf {
        let mut path = self.root.join(WORKFLOWS_DIRNAME);
        path.push(format!("{}.json", encode_file_segment(workflow_id.as_str())));
        path
    }

    /// The workflow id bound to `key`, if any. A missing index reads as empty.
    pub fn lookup_scope(&self, key: &FetchKey) -> Result<Option<WorkflowId>, BackendError> {
        let index = self.load_scope_index()?;
        let Some(raw) = index.scopes.get(&key.to_string()) else {
            return Ok(None);
        };
        WorkflowId::new(raw.as_str())
            .map(Some)
            .map_err(|source| BackendError::InvalidId {
                field: "scopes",
                value: raw.clone(),
                source,
            })
    }

    pub fn bind_scope(&self, key: &FetchKey, workflow_id: &WorkflowId) -> Result<(), BackendError> {
        let mut index = self.load_scope_index()?;
        index.scopes.insert(key.to_string(), workflow_id.to_string());
        self.write_json(&self.scopes_path(), &index)
    }

    pub fn load_record(&self, workflow_id: &WorkflowId) -> Result<WorkflowRecord, BackendError> {
        let path = self.workflow_path(workflow_id);
        match read_json::<WorkflowRecord>(&path)? {
            Some(record) => Ok(record),
            None => Err(BackendError::WorkflowNotFound { workflow_id: workflow_id.clone() }),
        }
    }

    pub fn save_record(&self, record: &WorkflowRecord) -> Result<(), BackendError> {
        let workflow_id = record_workflow_id(record)?;
        self.write_json(&self.workflow_path(&workflow_id), record)
    }

    /// Writes the record and binds `key` to it.
    pub fn seed(&self, key: &FetchKey, record: &WorkflowRecord) -> Result<(), BackendError> {
        self.save_record(record)?;
        self.bind_scope(key, &record_workflow_id(record)?)
    }

    /// Blocking form of the fetch contract.
    pub fn fetch_record(&self, key: &FetchKey) -> Result<WorkflowRecord, BackendError> {
        let Some(workflow_id) = self.lookup_scope(key)? else {
            return Err(BackendError::ScopeNotFound { key: key.clone() });
        };
        let record = self.load_record(&workflow_id)?;
        debug!(%key, %workflow_id, states = record.states.len(), "fetched workflow record");
        Ok(record)
    }

    /// Blocking form of the persist contract. Replaces the stored transition set.
    pub fn persist_record(
        &self,
        workflow_id: &WorkflowId,
        payload: &PersistPayload,
    ) -> Result<(), BackendError> {
        let mut record = self.load_record(workflow_id)?;
        record.apply_persist(payload);
        self.save_record(&record)?;
        info!(
            %workflow_id,
            transitions = payload.transitions.len(),
            durability = ?self.durability,
            "persisted workflow transitions"
        );
        Ok(())
    }

    /// Whether the scope index exists yet.
    pub fn is_initialized(&self) -> Result<bool, BackendError> {
        let path = self.scopes_path();
        match fs::metadata(&path) {
            Ok(md) => Ok(md.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(BackendError::Io { path, source }),
        }
    }

    fn load_scope_index(&self) -> Result<ScopeIndexJson, BackendError> {
        Ok(read_json::<ScopeIndexJson>(&self.scopes_path())?.unwrap_or_default())
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), BackendError> {
        let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| BackendError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        bytes.push(b'\n');
        write_atomic(&self.root, path, &bytes, self.durability)
    }
}

fn record_workflow_id(record: &WorkflowRecord) -> Result<WorkflowId, BackendError> {
    WorkflowId::new(record.workflow_id.as_str()).map_err(|source| BackendError::InvalidId {
        field: "workflowId",
        value: record.workflow_id.clone(),
        source,
    })
}

impl WorkflowBackend for WorkflowFolder {
    fn fetch_workflow(
        &self,
        key: &FetchKey,
    ) -> impl Future<Output = Result<WorkflowRecord, BackendError>> + Send {
        let folder = self.clone();
        let key = key.clone();
        async move { tokio::task::spawn_blocking(move || folder.fetch_record(&key)).await? }
    }

    fn persist_transitions(
        &self,
        workflow_id: &WorkflowId,
        payload: &PersistPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let folder = self.clone();
        let workflow_id = workflow_id.clone();
        let payload = payload.clone();
        async move {
            tokio::task::spawn_blocking(move || folder.persist_record(&workflow_id, &payload))
                .await?
        }
    }
}
