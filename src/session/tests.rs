// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::fixture;
use tracing_test::traced_test;

use super::{
    MergeOutcome, SessionError, SessionStatus, SessionWarning, Staged, WorkflowSession,
};
use crate::format::{TransitionRecord, WorkflowRecord};
use crate::model::fixtures::{key, scenario_workflow, transition};
use crate::model::{
    BoardId, FetchKey, IntegrityWarning, MissingEndpoint, Scope, Transition, WorkflowId,
};
use crate::ops::{EditError, EditOutcome};
use crate::render::RenderOptions;
use crate::store::{BackendError, MemoryBackend};

fn board(value: &str) -> Scope {
    Scope::board(BoardId::new(value).unwrap())
}

fn scenario_id() -> WorkflowId {
    WorkflowId::new("wf-scenario").unwrap()
}

#[fixture]
fn backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.insert(
        FetchKey::Board(BoardId::new("b1").unwrap()),
        WorkflowRecord::from_workflow(&scenario_workflow()),
    );
    backend
}

async fn loaded(backend: MemoryBackend) -> WorkflowSession<MemoryBackend> {
    let mut session = WorkflowSession::new(backend, RenderOptions::default());
    session.load(board("b1")).await.unwrap();
    session
}

fn pairs(session: &WorkflowSession<MemoryBackend>) -> Vec<(String, String)> {
    session
        .workflow()
        .unwrap()
        .transitions()
        .iter()
        .map(|t| (t.from_key().to_string(), t.to_key().to_string()))
        .collect()
}

fn pair(from: &str, to: &str) -> (String, String) {
    (from.to_owned(), to.to_owned())
}

async fn connect(session: &mut WorkflowSession<MemoryBackend>, from: &str, to: &str) -> MergeOutcome {
    let editor = session.editor_mut().unwrap();
    assert!(editor.begin_connect(&key(from)));
    let event = editor.complete_connect(&key(to)).unwrap().expect("connect event");
    session.handle_event(event).await.unwrap().expect("merge outcome")
}

#[tokio::test]
async fn load_builds_model_and_diagram_together() {
    let session = loaded(backend()).await;

    assert_eq!(session.status(), SessionStatus::Loaded);
    assert_eq!(session.scope(), Some(&board("b1")));
    assert_eq!(session.workflow().unwrap().states().len(), 3);
    assert!(session.editor().unwrap().text().contains("In Progress"));
    assert!(session.warnings().is_empty());
    assert!(session.panel().is_none());
}

#[tokio::test]
async fn failed_load_leaves_session_unloaded() {
    let mut session = loaded(backend()).await;

    let err = session.select_scope(board("missing")).await.unwrap_err();

    assert!(matches!(err, SessionError::Backend(BackendError::ScopeNotFound { .. })));
    assert_eq!(session.status(), SessionStatus::Unloaded);
    assert!(session.workflow().is_none());
    assert!(session.editor().is_none());
}

#[tokio::test]
async fn malformed_record_is_a_decode_error() {
    let backend = backend();
    let mut record = WorkflowRecord::from_workflow(&scenario_workflow());
    record.states.push(record.states[0].clone());
    backend.insert(FetchKey::Board(BoardId::new("b2").unwrap()), record);

    let mut session = WorkflowSession::new(backend, RenderOptions::default());
    let err = session.load(board("b2")).await.unwrap_err();

    assert!(matches!(err, SessionError::Decode(_)));
    assert_eq!(session.status(), SessionStatus::Unloaded);
}

fn with_dangling(backend: &MemoryBackend) {
    let mut record = WorkflowRecord::from_workflow(&scenario_workflow());
    record.transitions.push(TransitionRecord {
        from_key: "done".to_owned(),
        to_key: "archived".to_owned(),
        from_order: Some(3),
        to_order: Some(9),
    });
    backend.insert(FetchKey::Board(BoardId::new("b2").unwrap()), record);
}

fn remote_pairs(backend: &MemoryBackend) -> Vec<(String, String)> {
    backend
        .record(&scenario_id())
        .unwrap()
        .transitions
        .iter()
        .map(|t| (t.from_key.clone(), t.to_key.clone()))
        .collect()
}

#[tokio::test]
#[traced_test]
async fn dangling_transitions_are_kept_and_reported_on_load() {
    let backend = backend();
    with_dangling(&backend);

    let mut session = WorkflowSession::new(backend, RenderOptions::default());
    session.load(board("b2")).await.unwrap();

    assert_eq!(
        pairs(&session),
        vec![pair("todo", "doing"), pair("doing", "done"), pair("done", "archived")]
    );
    assert!(matches!(
        session.warnings(),
        [SessionWarning::Integrity(IntegrityWarning { missing: MissingEndpoint::To, .. })]
    ));
    assert_eq!(session.editor().unwrap().projection().edges().len(), 2);
    assert!(logs_contain("transition order integrity"));
    assert!(logs_contain("done -> archived"));
}

#[tokio::test]
#[traced_test]
async fn editing_another_node_keeps_a_dangling_transition_remote() {
    let backend = backend();
    with_dangling(&backend);
    let mut session = WorkflowSession::new(backend.clone(), RenderOptions::default());
    session.load(board("b2")).await.unwrap();

    let outcome = connect(&mut session, "todo", "done").await;

    assert_eq!(outcome, MergeOutcome::Persisted);
    assert_eq!(
        remote_pairs(&backend),
        vec![
            pair("todo", "doing"),
            pair("doing", "done"),
            pair("done", "archived"),
            pair("todo", "done"),
        ]
    );
    let (_, payload) = backend.persisted().pop().unwrap();
    let archived = payload.transitions.iter().find(|t| t.to_key == "archived").unwrap();
    assert_eq!((archived.from_order, archived.to_order), (Some(3), Some(9)));
    assert!(matches!(session.warnings(), [SessionWarning::Integrity(_)]));
    assert!(logs_contain("transition order integrity"));
}

#[tokio::test]
async fn panel_save_may_keep_the_node_own_dangling_transition() {
    let backend = backend();
    with_dangling(&backend);
    let mut session = WorkflowSession::new(backend.clone(), RenderOptions::default());
    session.load(board("b2")).await.unwrap();

    session.open_panel(&key("done")).unwrap();
    session.toggle_panel_target(&key("todo")).unwrap();
    assert_eq!(session.save_panel().await.unwrap(), MergeOutcome::Persisted);

    assert!(remote_pairs(&backend).contains(&pair("done", "archived")));
    assert!(remote_pairs(&backend).contains(&pair("done", "todo")));

    let err = session
        .apply_node_edit(&key("todo"), vec![transition("todo", "archived")])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Edit(EditError::StateNotFound { .. })));
}

#[tokio::test]
async fn connect_gesture_merges_and_persists_with_orders() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;

    let outcome = connect(&mut session, "todo", "done").await;

    assert_eq!(outcome, MergeOutcome::Persisted);
    assert_eq!(session.status(), SessionStatus::Loaded);
    assert_eq!(
        pairs(&session),
        vec![pair("todo", "doing"), pair("doing", "done"), pair("todo", "done")]
    );
    assert_eq!(session.workflow().unwrap().rev(), 1);
    assert!(session.editor().unwrap().projection().edges().iter().all(|e| !e.is_pending()));

    let log = backend.persisted();
    assert_eq!(log.len(), 1);
    let (workflow_id, payload) = &log[0];
    assert_eq!(workflow_id, &scenario_id());
    assert_eq!(payload.name, "workflow update");
    let added = payload.transitions.last().unwrap();
    assert_eq!((added.from_key.as_str(), added.to_key.as_str()), ("todo", "done"));
    assert_eq!((added.from_order, added.to_order), (Some(1), Some(3)));
}

#[tokio::test]
async fn empty_panel_list_removes_the_node_outgoing_transitions() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;

    let outcome = session.apply_node_edit(&key("doing"), Vec::new()).await.unwrap();

    assert_eq!(outcome, MergeOutcome::Persisted);
    assert_eq!(pairs(&session), vec![pair("todo", "doing")]);
    assert_eq!(backend.record(&scenario_id()).unwrap().transitions.len(), 1);
}

#[tokio::test]
#[traced_test]
async fn failed_persist_keeps_local_edit_until_reload() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;
    backend.fail_persist_with("gateway timeout");

    let outcome = connect(&mut session, "todo", "done").await;

    assert_eq!(outcome, MergeOutcome::PersistFailed);
    assert_eq!(session.status(), SessionStatus::LoadedWithWarning);
    assert!(session.is_remote_stale());
    assert!(pairs(&session).contains(&pair("todo", "done")));
    assert!(matches!(
        session.warnings().last(),
        Some(SessionWarning::PersistFailed { message }) if message.contains("gateway timeout")
    ));
    assert!(logs_contain("saving transitions failed"));
    assert!(backend.persisted().is_empty());

    backend.clear_failures();
    session.reload().await.unwrap();

    assert_eq!(session.status(), SessionStatus::Loaded);
    assert!(!pairs(&session).contains(&pair("todo", "done")));
}

#[tokio::test]
async fn unchanged_edit_skips_persist_unless_remote_is_stale() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;
    let current = vec![transition("todo", "doing")];

    let outcome = session.apply_node_edit(&key("todo"), current.clone()).await.unwrap();
    assert_eq!(outcome, MergeOutcome::Unchanged);
    assert!(backend.persisted().is_empty());
    assert_eq!(session.workflow().unwrap().rev(), 0);

    backend.fail_persist_with("offline");
    session.apply_node_edit(&key("todo"), Vec::new()).await.unwrap();
    backend.clear_failures();

    let outcome = session.apply_node_edit(&key("todo"), Vec::new()).await.unwrap();
    assert_eq!(outcome, MergeOutcome::Persisted);
    assert_eq!(session.status(), SessionStatus::Loaded);
    assert!(!session.is_remote_stale());
    assert_eq!(backend.persisted().len(), 1);
}

#[tokio::test]
async fn edits_referencing_unknown_states_are_rejected_before_mutation() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;
    let before = session.workflow().unwrap().clone();

    let err = session
        .apply_node_edit(&key("todo"), vec![transition("todo", "ghost")])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Edit(EditError::StateNotFound { .. })));

    let err = session
        .apply_node_edit(&key("todo"), vec![transition("doing", "done")])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Edit(EditError::ForeignSource { .. })));

    assert_eq!(session.workflow(), Some(&before));
    assert!(backend.persisted().is_empty());
}

#[tokio::test]
async fn selecting_a_state_opens_its_panel_and_saving_merges_it() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;

    let event = crate::diagram::DiagramEvent::StateSelected(key("todo"));
    assert_eq!(session.handle_event(event).await.unwrap(), None);
    assert_eq!(session.panel().unwrap().node_key(), &key("todo"));
    assert_eq!(session.editor().unwrap().selected(), Some(&key("todo")));

    assert_eq!(session.toggle_panel_target(&key("done")).unwrap(), EditOutcome::Applied);
    assert_eq!(session.toggle_panel_target(&key("doing")).unwrap(), EditOutcome::Applied);
    assert!(session.panel().unwrap().is_dirty());

    assert_eq!(session.save_panel().await.unwrap(), MergeOutcome::Persisted);

    assert_eq!(pairs(&session), vec![pair("doing", "done"), pair("todo", "done")]);
    let panel = session.panel().unwrap();
    assert!(!panel.is_dirty());
    assert_eq!(panel.base_rev(), 1);
    assert_eq!(backend.persisted().len(), 1);
}

#[tokio::test]
async fn dirty_panel_goes_stale_after_another_edit() {
    let mut session = loaded(backend()).await;
    session.open_panel(&key("todo")).unwrap();
    session.toggle_panel_target(&key("done")).unwrap();

    connect(&mut session, "done", "todo").await;

    match session.save_panel().await.unwrap_err() {
        SessionError::StalePanel { base_rev, current_rev } => {
            assert_eq!((base_rev, current_rev), (0, 1));
        }
        other => panic!("expected StalePanel, got: {other:?}"),
    }
    assert!(!pairs(&session).contains(&pair("todo", "done")));
}

#[tokio::test]
async fn clean_panel_follows_the_model() {
    let mut session = loaded(backend()).await;
    session.open_panel(&key("todo")).unwrap();

    connect(&mut session, "todo", "done").await;

    let panel = session.panel().unwrap();
    assert_eq!(panel.base_rev(), 1);
    assert!(panel.targets(&key("done")));
}

#[tokio::test]
async fn panel_calls_need_an_open_panel() {
    let mut session = loaded(backend()).await;

    assert!(matches!(session.toggle_panel_target(&key("done")), Err(SessionError::NoPanel)));
    assert!(matches!(session.save_panel().await, Err(SessionError::NoPanel)));
    assert!(matches!(
        session.open_panel(&key("ghost")),
        Err(SessionError::Edit(EditError::StateNotFound { .. }))
    ));
}

#[tokio::test]
async fn reordering_a_state_rewrites_orders_and_forces_next_persist() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;

    session.set_state_order(&key("done"), 30).unwrap();
    assert!(session.is_remote_stale());
    let doing_done = session
        .workflow()
        .unwrap()
        .transitions()
        .iter()
        .find(|t| t.connects(&key("doing"), &key("done")))
        .cloned()
        .unwrap();
    assert_eq!(doing_done.to_order(), 30);

    let outcome = session
        .apply_node_edit(&key("todo"), vec![transition("todo", "doing")])
        .await
        .unwrap();

    assert_eq!(outcome, MergeOutcome::Persisted);
    let (_, payload) = backend.persisted().pop().unwrap();
    let sent = payload.transitions.iter().find(|t| t.to_key == "done").unwrap();
    assert_eq!(sent.to_order, Some(30));
}

#[tokio::test]
async fn edits_apply_in_issue_order() {
    let mut session = loaded(backend()).await;

    connect(&mut session, "todo", "done").await;
    let mut todo = session.workflow().unwrap().outgoing_transitions(&key("todo"));
    todo.retain(|t: &Transition| t.to_key() != &key("doing"));
    session.apply_node_edit(&key("todo"), todo).await.unwrap();

    assert_eq!(pairs(&session), vec![pair("doing", "done"), pair("todo", "done")]);
    assert_eq!(session.workflow().unwrap().rev(), 2);
}

#[tokio::test]
async fn calls_before_load_report_not_loaded() {
    let mut session = WorkflowSession::new(backend(), RenderOptions::default());

    assert!(matches!(session.reload().await, Err(SessionError::NotLoaded)));
    assert!(matches!(
        session.apply_node_edit(&key("todo"), Vec::new()).await,
        Err(SessionError::NotLoaded)
    ));
    assert!(session.summary().is_none());
}

#[tokio::test]
async fn summary_describes_the_loaded_workflow() {
    let mut session = loaded(backend()).await;
    session.unload();
    assert_eq!(session.status(), SessionStatus::Unloaded);
    session.load(board("b1")).await.unwrap();

    let summary = session.summary().unwrap();
    assert_eq!(summary.states, 3);
    assert_eq!(summary.transitions, 2);
    assert!(!summary.complete);
    assert_eq!(
        summary.to_string(),
        "Scenario [loaded] rev 0: 3 states, 2 transitions, 0/3 fully connected"
    );
}

#[tokio::test]
async fn staged_edit_is_local_until_the_persist_is_settled() {
    let backend = backend();
    let mut session = loaded(backend.clone()).await;

    let updated = vec![transition("todo", "doing"), transition("todo", "done")];
    let staged = session.stage_node_edit(&key("todo"), updated).unwrap();
    let Staged::Persist(pending) = staged else {
        panic!("expected a persist");
    };

    assert_eq!(session.status(), SessionStatus::Merging);
    assert!(pairs(&session).contains(&pair("todo", "done")));
    assert_eq!(pending.rev, 1);
    assert!(backend.persisted().is_empty());

    let refused = Err(BackendError::Rejected { reason: "busy".into() });
    let outcome = session.finish_persist(&pending, refused);
    assert_eq!(outcome, MergeOutcome::PersistFailed);
    assert_eq!(session.status(), SessionStatus::LoadedWithWarning);
    assert!(session.is_remote_stale());
}

#[tokio::test]
async fn settling_an_older_persist_keeps_a_later_reorder_pending() {
    let mut session = loaded(backend()).await;
    let staged = session.stage_node_edit(&key("doing"), Vec::new()).unwrap();
    let Staged::Persist(pending) = staged else {
        panic!("expected a persist");
    };

    session.set_state_order(&key("done"), 10).unwrap();
    let outcome = session.finish_persist(&pending, Ok(()));

    assert_eq!(outcome, MergeOutcome::Persisted);
    assert_eq!(session.status(), SessionStatus::Loaded);
    assert!(session.is_remote_stale(), "reorder made after staging is not on the remote yet");
}

#[tokio::test]
async fn unchanged_stage_needs_no_persist() {
    let mut session = loaded(backend()).await;
    let staged = session.stage_node_edit(&key("todo"), vec![transition("todo", "doing")]).unwrap();
    assert_eq!(staged, Staged::Unchanged);
    assert_eq!(session.status(), SessionStatus::Loaded);
}
