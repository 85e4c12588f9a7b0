// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Workflow session controller.
//!
//! A [`WorkflowSession`] owns one loaded workflow together with its diagram editor and open
//! transition panel. It merges edits into the model, rewrites transition orders, and persists
//! the result through the [`WorkflowBackend`] contracts. Callers that must not wait on the
//! backend stage an edit, send its [`PendingPersist`] themselves, and hand the answer back with
//! [`WorkflowSession::finish_persist`].

mod backend;
mod controller;
mod error;
#[cfg(test)]
mod tests;

pub use backend::WorkflowBackend;
pub use controller::{
    MergeOutcome, PendingPersist, SessionStatus, SessionSummary, Staged, WorkflowSession,
};
pub use error::{SessionError, SessionWarning};
