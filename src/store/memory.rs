// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::format::{PersistPayload, StateRecord, TransitionRecord, WorkflowRecord};
use crate::model::{BoardId, FetchKey, WorkflowId};
use crate::session::WorkflowBackend;

use super::BackendError;

/// Board id the demo workflow is bound to.
pub const DEMO_BOARD_ID: &str = "demo";

#[derive(Debug, Default)]
struct MemoryState {
    scopes: BTreeMap<FetchKey, WorkflowId>,
    records: BTreeMap<WorkflowId, WorkflowRecord>,
    fail_fetch: Option<String>,
    fail_persist: Option<String>,
    persisted: Vec<(WorkflowId, PersistPayload)>,
}

/// In-memory backend. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend holding one five-column board under `board:demo`.
    pub fn demo() -> Self {
        let backend = Self::new();
        if let Ok(board_id) = BoardId::new(DEMO_BOARD_ID) {
            backend.insert(FetchKey::Board(board_id), demo_record());
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `record` and binds `key` to it. Records with an invalid id are ignored.
    pub fn insert(&self, key: FetchKey, record: WorkflowRecord) -> bool {
        let Ok(workflow_id) = WorkflowId::new(record.workflow_id.as_str()) else {
            return false;
        };
        let mut state = self.lock();
        state.scopes.insert(key, workflow_id.clone());
        state.records.insert(workflow_id, record);
        true
    }

    pub fn record(&self, workflow_id: &WorkflowId) -> Option<WorkflowRecord> {
        self.lock().records.get(workflow_id).cloned()
    }

    /// Every payload accepted so far, oldest first.
    pub fn persisted(&self) -> Vec<(WorkflowId, PersistPayload)> {
        self.lock().persisted.clone()
    }

    /// Makes every following fetch fail with [`BackendError::Rejected`].
    pub fn fail_fetch_with(&self, reason: impl Into<String>) {
        self.lock().fail_fetch = Some(reason.into());
    }

    /// Makes every following persist fail with [`BackendError::Rejected`].
    pub fn fail_persist_with(&self, reason: impl Into<String>) {
        self.lock().fail_persist = Some(reason.into());
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.fail_fetch = None;
        state.fail_persist = None;
    }

    fn fetch_now(&self, key: &FetchKey) -> Result<WorkflowRecord, BackendError> {
        let state = self.lock();
        if let Some(reason) = &state.fail_fetch {
            return Err(BackendError::Rejected { reason: reason.clone() });
        }
        let Some(workflow_id) = state.scopes.get(key) else {
            return Err(BackendError::ScopeNotFound { key: key.clone() });
        };
        let record = state
            .records
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| BackendError::WorkflowNotFound { workflow_id: workflow_id.clone() })?;
        debug!(%key, %workflow_id, "fetched workflow record from memory");
        Ok(record)
    }

    fn persist_now(
        &self,
        workflow_id: &WorkflowId,
        payload: &PersistPayload,
    ) -> Result<(), BackendError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(reason) = &state.fail_persist {
            return Err(BackendError::Rejected { reason: reason.clone() });
        }
        let Some(record) = state.records.get_mut(workflow_id) else {
            return Err(BackendError::WorkflowNotFound { workflow_id: workflow_id.clone() });
        };
        record.apply_persist(payload);
        state.persisted.push((workflow_id.clone(), payload.clone()));
        info!(%workflow_id, transitions = payload.transitions.len(), "persisted workflow transitions");
        Ok(())
    }
}

impl WorkflowBackend for MemoryBackend {
    fn fetch_workflow(
        &self,
        key: &FetchKey,
    ) -> impl Future<Output = Result<WorkflowRecord, BackendError>> + Send {
        let result = self.fetch_now(key);
        async move { result }
    }

    fn persist_transitions(
        &self,
        workflow_id: &WorkflowId,
        payload: &PersistPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        let result = self.persist_now(workflow_id, payload);
        async move { result }
    }
}

fn demo_record() -> WorkflowRecord {
    let state = |key: &str, name: &str, color: &str, order: i64| StateRecord {
        key: key.to_owned(),
        name: Some(name.to_owned()),
        color: Some(color.to_owned()),
        order: Some(order),
        category: None,
    };
    let transition = |from: &str, to: &str| TransitionRecord {
        from_key: from.to_owned(),
        to_key: to.to_owned(),
        from_order: None,
        to_order: None,
    };

    WorkflowRecord {
        workflow_id: "wf-demo".to_owned(),
        name: "Delivery board".to_owned(),
        states: vec![
            state("backlog", "Backlog", "#64748b", 0),
            state("todo", "To Do", "#3b82f6", 1),
            state("in_progress", "In Progress", "#f59e0b", 2),
            state("review", "Review", "#a855f7", 3),
            state("done", "Done", "#22c55e", 4),
        ],
        transitions: vec![
            transition("backlog", "todo"),
            transition("todo", "in_progress"),
            transition("in_progress", "review"),
            transition("review", "done"),
            transition("review", "in_progress"),
        ],
    }
}
