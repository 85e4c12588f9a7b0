// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use tracing::{debug, info, warn};

use crate::diagram::{DiagramEditor, DiagramEvent};
use crate::format::{decode_workflow, PersistPayload};
use crate::model::{
    merge_node_transitions, with_order_applied, IntegrityWarning, Scope, StateKey, Transition,
    Workflow, WorkflowId,
};
use crate::ops::{EditError, EditOutcome, TransitionPanel};
use crate::render::RenderOptions;
use crate::store::BackendError;

use super::backend::WorkflowBackend;
use super::error::{SessionError, SessionWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unloaded,
    Loaded,
    /// A persist call is in flight; the local model already holds the edit.
    Merging,
    /// The last persist failed. The local model is kept and the remote copy may be stale.
    LoadedWithWarning,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Merging => "saving",
            Self::LoadedWithWarning => "loaded (remote may be stale)",
        })
    }
}

/// What happened to an edit handed to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Persisted,
    /// The merged set equals the current one and the remote copy is in sync.
    Unchanged,
    /// Applied locally, but the backend refused it. See [`WorkflowSession::warnings`].
    PersistFailed,
}

/// A locally merged edit whose full-replacement payload still has to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPersist {
    pub workflow_id: WorkflowId,
    pub payload: PersistPayload,
    /// Workflow revision the payload was taken at.
    pub rev: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staged {
    /// Nothing to send; the merged set equals the current one.
    Unchanged,
    Persist(PendingPersist),
}

#[derive(Debug)]
struct LoadedWorkflow {
    scope: Scope,
    workflow: Workflow,
    editor: DiagramEditor,
    panel: Option<TransitionPanel>,
}

/// One workflow view: the model, its diagram and the open panel, kept consistent with a backend.
///
/// Every mutating call takes `&mut self`, so edits are applied strictly one after another and
/// each merge starts from the result of the previous one.
#[derive(Debug)]
pub struct WorkflowSession<B> {
    backend: B,
    options: RenderOptions,
    status: SessionStatus,
    loaded: Option<LoadedWorkflow>,
    warnings: Vec<SessionWarning>,
    remote_stale: bool,
}

impl<B: WorkflowBackend> WorkflowSession<B> {
    pub fn new(backend: B, options: RenderOptions) -> Self {
        Self {
            backend,
            options,
            status: SessionStatus::Unloaded,
            loaded: None,
            warnings: Vec::new(),
            remote_stale: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.loaded.as_ref().map(|l| &l.scope)
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.loaded.as_ref().map(|l| &l.workflow)
    }

    pub fn editor(&self) -> Option<&DiagramEditor> {
        self.loaded.as_ref().map(|l| &l.editor)
    }

    pub fn editor_mut(&mut self) -> Option<&mut DiagramEditor> {
        self.loaded.as_mut().map(|l| &mut l.editor)
    }

    pub fn panel(&self) -> Option<&TransitionPanel> {
        self.loaded.as_ref().and_then(|l| l.panel.as_ref())
    }

    /// Warnings raised by the most recent load or edit.
    pub fn warnings(&self) -> &[SessionWarning] {
        &self.warnings
    }

    /// Whether the remote transition set may differ from the local one.
    pub fn is_remote_stale(&self) -> bool {
        self.remote_stale
    }

    /// Fetches and decodes the workflow for `scope`, replacing whatever was loaded.
    ///
    /// States and transitions arrive together; nothing is shown until both are decoded. On
    /// failure the session stays unloaded.
    pub async fn load(&mut self, scope: Scope) -> Result<(), SessionError> {
        self.unload();

        let key = scope.fetch_key();
        let record = self.backend.fetch_workflow(&key).await?;
        let decoded = decode_workflow(&record)?;
        for warning in &decoded.warnings {
            warn!(%key, %warning, "workflow record coerced");
        }

        let editor = DiagramEditor::new(&decoded.workflow, self.options)?;
        info!(
            %key,
            workflow_id = %decoded.workflow.workflow_id(),
            states = decoded.workflow.states().len(),
            transitions = decoded.workflow.transitions().len(),
            "workflow loaded"
        );

        self.warnings = decoded.warnings.into_iter().map(SessionWarning::Decode).collect();
        self.warnings.extend(integrity_warnings(decoded.workflow.integrity_warnings()));
        self.loaded = Some(LoadedWorkflow {
            scope,
            workflow: decoded.workflow,
            editor,
            panel: None,
        });
        self.status = SessionStatus::Loaded;
        Ok(())
    }

    pub fn unload(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            debug!(workflow_id = %loaded.workflow.workflow_id(), "workflow unloaded");
        }
        self.warnings.clear();
        self.remote_stale = false;
        self.status = SessionStatus::Unloaded;
    }

    /// Switches to another board or team view.
    pub async fn select_scope(&mut self, scope: Scope) -> Result<(), SessionError> {
        self.load(scope).await
    }

    /// Re-fetches the current scope. This is the only way to pick up remote changes.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        let scope = self.scope().cloned().ok_or(SessionError::NotLoaded)?;
        self.load(scope).await
    }

    /// Routes a diagram event. Selection opens the panel; a connect gesture becomes an edit.
    pub async fn handle_event(
        &mut self,
        event: DiagramEvent,
    ) -> Result<Option<MergeOutcome>, SessionError> {
        match self.stage_event(event)? {
            Some(staged) => Ok(Some(self.drive(staged).await)),
            None => Ok(None),
        }
    }

    /// The synchronous half of [`Self::handle_event`]: the panel is opened or the connect edit is
    /// merged locally, and the backend call is left to the caller.
    pub fn stage_event(&mut self, event: DiagramEvent) -> Result<Option<Staged>, SessionError> {
        match event {
            DiagramEvent::StateSelected(key) => {
                self.open_panel(&key)?;
                Ok(None)
            }
            DiagramEvent::ConnectRequested { from, to } => {
                let loaded = self.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
                let mut updated = loaded.workflow.outgoing_transitions(&from);
                updated.push(Transition::new(from.clone(), to));
                self.stage_node_edit(&from, updated).map(Some)
            }
        }
    }

    /// Merges `updated` as the complete outgoing list of `node_key` and persists the result.
    ///
    /// A failed persist keeps the local set and leaves the session in
    /// [`SessionStatus::LoadedWithWarning`]; it is not retried.
    pub async fn apply_node_edit(
        &mut self,
        node_key: &StateKey,
        updated: Vec<Transition>,
    ) -> Result<MergeOutcome, SessionError> {
        let staged = self.stage_node_edit(node_key, updated)?;
        Ok(self.drive(staged).await)
    }

    /// Validates, merges and applies a node edit locally.
    ///
    /// Unknown states reject the edit before anything changes, and the diagram drops any
    /// candidate edge. A transition the node already had to a since-deleted state may be kept;
    /// it is carried through with its last-known orders and reported as an integrity warning.
    /// Otherwise the merge, the order rewrite and the local update happen here, the status moves
    /// to [`SessionStatus::Merging`], and the returned [`PendingPersist`] must be settled with
    /// [`Self::finish_persist`].
    pub fn stage_node_edit(
        &mut self,
        node_key: &StateKey,
        updated: Vec<Transition>,
    ) -> Result<Staged, SessionError> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NotLoaded)?;

        if let Err(err) = validate_edit(&loaded.workflow, node_key, &updated) {
            loaded.editor.sync(&loaded.workflow)?;
            return Err(err.into());
        }

        let merged = merge_node_transitions(loaded.workflow.transitions(), &updated, node_key);
        let applied = with_order_applied(&merged, loaded.workflow.states());
        self.warnings = integrity_warnings(applied.warnings);

        if applied.transitions == loaded.workflow.transitions() && !self.remote_stale {
            loaded.editor.sync(&loaded.workflow)?;
            debug!(node = %node_key, "edit left transitions unchanged");
            return Ok(Staged::Unchanged);
        }

        loaded.workflow.replace_transitions(applied.transitions);
        loaded.workflow.bump_rev();
        loaded.editor.sync(&loaded.workflow)?;
        refresh_clean_panel(loaded);
        self.status = SessionStatus::Merging;

        Ok(Staged::Persist(PendingPersist {
            workflow_id: loaded.workflow.workflow_id().clone(),
            payload: PersistPayload::transition_update(loaded.workflow.transitions()),
            rev: loaded.workflow.rev(),
        }))
    }

    /// Records the backend's answer to a staged edit.
    ///
    /// The remote copy only counts as in sync when nothing changed locally since the edit was
    /// staged.
    pub fn finish_persist(
        &mut self,
        pending: &PendingPersist,
        result: Result<(), BackendError>,
    ) -> MergeOutcome {
        let workflow_id = &pending.workflow_id;
        let rev = pending.rev;
        let current_rev = self.workflow().map(Workflow::rev);
        match result {
            Ok(()) => {
                let transitions = pending.payload.transitions.len();
                info!(%workflow_id, rev, transitions, "transitions saved");
                if current_rev == Some(rev) {
                    self.remote_stale = false;
                }
                self.status = SessionStatus::Loaded;
                MergeOutcome::Persisted
            }
            Err(err) => {
                warn!(%workflow_id, rev, error = %err, "saving transitions failed; keeping local edit");
                self.warnings.push(SessionWarning::PersistFailed { message: err.to_string() });
                self.remote_stale = true;
                self.status = SessionStatus::LoadedWithWarning;
                MergeOutcome::PersistFailed
            }
        }
    }

    async fn drive(&mut self, staged: Staged) -> MergeOutcome {
        match staged {
            Staged::Unchanged => MergeOutcome::Unchanged,
            Staged::Persist(pending) => {
                let result = self
                    .backend
                    .persist_transitions(&pending.workflow_id, &pending.payload)
                    .await;
                self.finish_persist(&pending, result)
            }
        }
    }

    /// Opens the transition panel for `key`, replacing any open panel.
    pub fn open_panel(&mut self, key: &StateKey) -> Result<&TransitionPanel, SessionError> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        let panel = TransitionPanel::open(&loaded.workflow, key)?;
        loaded.editor.select(key);
        Ok(&*loaded.panel.insert(panel))
    }

    pub fn close_panel(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.panel = None;
        }
    }

    /// Flips the panel's transition to `to_key`.
    pub fn toggle_panel_target(&mut self, to_key: &StateKey) -> Result<EditOutcome, SessionError> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        let panel = loaded.panel.as_mut().ok_or(SessionError::NoPanel)?;
        Ok(panel.toggle(&loaded.workflow, to_key)?)
    }

    /// Hands the panel's outgoing list to the merge.
    ///
    /// A panel opened before another edit landed is refused; reopen it to pick up the change.
    pub async fn save_panel(&mut self) -> Result<MergeOutcome, SessionError> {
        let staged = self.stage_panel_save()?;
        Ok(self.drive(staged).await)
    }

    /// The synchronous half of [`Self::save_panel`]. The panel is reopened on the merged set.
    pub fn stage_panel_save(&mut self) -> Result<Staged, SessionError> {
        let loaded = self.loaded.as_ref().ok_or(SessionError::NotLoaded)?;
        let panel = loaded.panel.as_ref().ok_or(SessionError::NoPanel)?;
        let edit = panel.node_edit();
        if edit.base_rev != loaded.workflow.rev() {
            return Err(SessionError::StalePanel {
                base_rev: edit.base_rev,
                current_rev: loaded.workflow.rev(),
            });
        }

        let staged = self.stage_node_edit(&edit.node_key, edit.transitions)?;
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.panel = Some(TransitionPanel::open(&loaded.workflow, &edit.node_key)?);
        }
        Ok(staged)
    }

    /// Moves a state to `order` and rewrites every transition's order copies.
    ///
    /// This is a local change only; the remote copy is flagged stale so the next edit is sent
    /// even when it leaves the transition pairs unchanged.
    pub fn set_state_order(&mut self, key: &StateKey, order: i64) -> Result<(), SessionError> {
        let loaded = self.loaded.as_mut().ok_or(SessionError::NotLoaded)?;
        let warnings = loaded.workflow.set_state_order(key, order)?;
        loaded.workflow.bump_rev();
        loaded.editor.sync(&loaded.workflow)?;
        refresh_clean_panel(loaded);
        self.warnings = integrity_warnings(warnings);
        self.remote_stale = true;
        Ok(())
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        let loaded = self.loaded.as_ref()?;
        let workflow = &loaded.workflow;
        Some(SessionSummary {
            status: self.status,
            name: workflow.name().to_owned(),
            rev: workflow.rev(),
            states: workflow.states().len(),
            transitions: workflow.transitions().len(),
            fully_connected: workflow.fully_connected_states().len(),
            complete: workflow.is_complete(),
            warnings: self.warnings.len(),
        })
    }
}

/// One-line description of a loaded session, used by the status bar and `--print`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub status: SessionStatus,
    pub name: String,
    pub rev: u64,
    pub states: usize,
    pub transitions: usize,
    pub fully_connected: usize,
    pub complete: bool,
    pub warnings: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] rev {}: {} states, {} transitions, {}/{} fully connected",
            self.name, self.status, self.rev, self.states, self.transitions,
            self.fully_connected, self.states
        )?;
        if self.complete {
            f.write_str(", complete")?;
        }
        if self.warnings > 0 {
            write!(f, ", {} warning(s)", self.warnings)?;
        }
        Ok(())
    }
}

fn validate_edit(
    workflow: &Workflow,
    node_key: &StateKey,
    updated: &[Transition],
) -> Result<(), EditError> {
    if !workflow.contains_state(node_key) {
        return Err(EditError::StateNotFound { key: node_key.clone() });
    }
    for transition in updated {
        if transition.from_key() != node_key {
            return Err(EditError::ForeignSource {
                node_key: node_key.clone(),
                from_key: transition.from_key().clone(),
            });
        }
        let to_key = transition.to_key();
        if !workflow.contains_state(to_key) && !workflow.has_transition(node_key, to_key) {
            return Err(EditError::StateNotFound { key: to_key.clone() });
        }
    }
    Ok(())
}

fn integrity_warnings(warnings: Vec<IntegrityWarning>) -> Vec<SessionWarning> {
    warnings
        .into_iter()
        .inspect(|warning| warn!(%warning, "transition order integrity"))
        .map(SessionWarning::Integrity)
        .collect()
}

/// A panel without local changes follows the model; a dirty one is left to go stale.
fn refresh_clean_panel(loaded: &mut LoadedWorkflow) {
    let Some(panel) = loaded.panel.as_mut() else {
        return;
    };
    if panel.is_dirty() {
        return;
    }
    if panel.reset(&loaded.workflow).is_err() {
        loaded.panel = None;
    }
}
