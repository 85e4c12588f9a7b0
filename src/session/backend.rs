// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use crate::format::{PersistPayload, WorkflowRecord};
use crate::model::{FetchKey, WorkflowId};
use crate::store::BackendError;

/// The two collaborator contracts a workflow session talks to.
///
/// Only the session controller calls these. Implementations decide where records live.
pub trait WorkflowBackend {
    /// Fetches states and transitions together for the board or team behind `key`.
    fn fetch_workflow(
        &self,
        key: &FetchKey,
    ) -> impl Future<Output = Result<WorkflowRecord, BackendError>> + Send;

    /// Replaces the stored transition set of `workflow_id` with `payload.transitions`.
    fn persist_transitions(
        &self,
        workflow_id: &WorkflowId,
        payload: &PersistPayload,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}
