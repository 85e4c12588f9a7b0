// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use super::theme::TuiTheme;
use super::{chrome, App, Command, Focus, ToastLevel};
use crate::diagram::{DiagramEvent, DiagramObject};
use crate::format::WorkflowRecord;
use crate::model::fixtures::{key, scenario_workflow};
use crate::model::{BoardId, FetchKey, Scope};
use crate::render::RenderOptions;
use crate::session::WorkflowSession;
use crate::store::MemoryBackend;

fn scenario_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.insert(
        FetchKey::Board(BoardId::new("b1").unwrap()),
        WorkflowRecord::from_workflow(&scenario_workflow()),
    );
    backend
}

async fn app_with(backend: MemoryBackend) -> App<MemoryBackend> {
    let mut session = WorkflowSession::new(backend, RenderOptions::default());
    session.load(Scope::board(BoardId::new("b1").unwrap())).await.unwrap();
    App::new(session, TuiTheme::default())
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Runs a command the way the event loop does, including its save.
async fn run_command(app: &mut App<MemoryBackend>, command: Command) {
    app.execute(command).await;
    app.settle().await;
}

/// Feeds keys one by one, running any command they produce.
async fn keys(app: &mut App<MemoryBackend>, codes: &[KeyCode]) {
    for &code in codes {
        if let Some(command) = app.handle_key(press(code)) {
            run_command(app, command).await;
        }
    }
}

fn draw(app: &mut App<MemoryBackend>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(110, 24)).unwrap();
    terminal.draw(|frame| chrome::draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
        .content
        .chunks(usize::from(buffer.area.width))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn toast(app: &App<MemoryBackend>) -> (ToastLevel, String) {
    let toast = app.toast.clone().expect("toast");
    (toast.level, toast.message)
}

#[tokio::test]
async fn frame_shows_diagram_and_summary() {
    let mut app = app_with(scenario_backend()).await;

    let screen = draw(&mut app);

    assert!(screen.contains("To Do"));
    assert!(screen.contains("In Progress"));
    assert!(screen.contains("Scenario [loaded] rev 0: 3 states, 2 transitions"));
    assert!(screen.contains("c connect"));
}

#[tokio::test]
async fn enter_opens_the_panel_for_the_selection() {
    let mut app = app_with(scenario_backend()).await;

    let command = app.handle_key(press(KeyCode::Enter));
    assert_eq!(command, Some(Command::Diagram(DiagramEvent::StateSelected(key("todo")))));
    run_command(&mut app, command.unwrap()).await;

    assert_eq!(app.focus, Focus::Panel);
    let screen = draw(&mut app);
    assert!(screen.contains("From: To Do"));
    assert!(screen.contains("[x] In Progress"));
    assert!(screen.contains("[ ] Done"));
    assert!(screen.contains("[ ] To Do (self)"));
}

#[tokio::test]
async fn panel_toggle_and_save_persists() {
    let backend = scenario_backend();
    let mut app = app_with(backend.clone()).await;

    keys(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Down, KeyCode::Char(' ')]).await;
    assert!(app.session.panel().unwrap().is_dirty());
    assert!(draw(&mut app).contains("From: To Do *"));

    keys(&mut app, &[KeyCode::Char('s')]).await;

    assert_eq!(backend.persisted().len(), 1);
    assert!(app.session.workflow().unwrap().has_transition(&key("todo"), &key("done")));
    assert!(!app.session.panel().unwrap().is_dirty());
    assert_eq!(toast(&app), (ToastLevel::Info, "saved (rev 1)".to_owned()));
}

#[tokio::test]
async fn connect_gesture_from_keys() {
    let backend = scenario_backend();
    let mut app = app_with(backend.clone()).await;

    keys(&mut app, &[KeyCode::Char('c'), KeyCode::Right, KeyCode::Right]).await;
    assert_eq!(app.session.editor().unwrap().connect_source(), Some(&key("todo")));
    assert!(draw(&mut app).contains("esc cancel"));

    let command = app.handle_key(press(KeyCode::Enter));
    assert_eq!(
        command,
        Some(Command::Diagram(DiagramEvent::ConnectRequested { from: key("todo"), to: key("done") }))
    );
    run_command(&mut app, command.unwrap()).await;

    assert_eq!(backend.persisted().len(), 1);
    assert!(app.session.workflow().unwrap().has_transition(&key("todo"), &key("done")));
}

#[tokio::test]
async fn escape_cancels_connect_before_closing_the_panel() {
    let mut app = app_with(scenario_backend()).await;
    keys(&mut app, &[KeyCode::Enter, KeyCode::Tab, KeyCode::Char('c')]).await;
    assert!(app.session.editor().unwrap().connect_source().is_some());

    keys(&mut app, &[KeyCode::Esc]).await;
    assert!(app.session.editor().unwrap().connect_source().is_none());
    assert!(app.session.panel().is_some());

    keys(&mut app, &[KeyCode::Esc]).await;
    assert!(app.session.panel().is_none());
    assert_eq!(app.focus, Focus::Diagram);
}

#[tokio::test]
async fn click_on_a_node_selects_it() {
    let mut app = app_with(scenario_backend()).await;
    draw(&mut app);

    let editor = app.session.editor().unwrap();
    let spans = editor.render().hit_index.get(&DiagramObject::Node(key("done"))).unwrap();
    let (y, x0, _) = spans[0];
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: app.diagram_area.x + x0 as u16 - app.scroll_x,
        row: app.diagram_area.y + y as u16 - app.scroll_y,
        modifiers: KeyModifiers::NONE,
    };

    assert_eq!(
        app.handle_mouse(click),
        Some(Command::Diagram(DiagramEvent::StateSelected(key("done"))))
    );
}

#[tokio::test]
async fn click_in_panel_toggles_the_row() {
    let mut app = app_with(scenario_backend()).await;
    keys(&mut app, &[KeyCode::Enter]).await;
    draw(&mut app);

    let panel_area = app.panel_area.expect("panel drawn");
    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: panel_area.x + 2,
        row: panel_area.y + chrome::PANEL_LIST_TOP + 2,
        modifiers: KeyModifiers::NONE,
    };

    assert_eq!(app.handle_mouse(click), None);
    assert_eq!(app.panel_cursor, 2);
    assert!(app.session.panel().unwrap().targets(&key("done")));
}

#[tokio::test]
async fn failed_save_is_reported_as_stale() {
    let backend = scenario_backend();
    backend.fail_persist_with("offline");
    let mut app = app_with(backend).await;

    keys(&mut app, &[KeyCode::Char('c'), KeyCode::Right, KeyCode::Right, KeyCode::Enter]).await;

    assert_eq!(toast(&app).0, ToastLevel::Warning);
    assert!(draw(&mut app).contains("remote may be stale"));
}

#[tokio::test]
async fn dirty_panel_goes_stale_after_another_edit() {
    let mut app = app_with(scenario_backend()).await;
    keys(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Down, KeyCode::Char(' ')]).await;

    keys(
        &mut app,
        &[KeyCode::Tab, KeyCode::Right, KeyCode::Char('c'), KeyCode::Left, KeyCode::Enter],
    )
    .await;
    assert!(app.session.workflow().unwrap().has_transition(&key("doing"), &key("todo")));

    keys(&mut app, &[KeyCode::Char('s')]).await;
    let (level, message) = toast(&app);
    assert_eq!(level, ToastLevel::Warning);
    assert!(message.contains("stale"), "{message}");
}

#[tokio::test]
async fn move_swaps_state_order_with_neighbor() {
    let mut app = app_with(scenario_backend()).await;

    keys(&mut app, &[KeyCode::Char('>')]).await;

    let columns = app.session.editor().unwrap().layout().columns().to_vec();
    assert_eq!(columns, vec![key("doing"), key("todo"), key("done")]);
    assert!(app.session.is_remote_stale());
    assert_eq!(app.session.editor().unwrap().selected(), Some(&key("todo")));
}

#[tokio::test]
async fn save_without_panel_is_an_error_toast() {
    let mut app = app_with(scenario_backend()).await;

    keys(&mut app, &[KeyCode::Char('s')]).await;

    assert_eq!(toast(&app), (ToastLevel::Error, "no transition panel is open".to_owned()));
}

#[tokio::test]
async fn quit_keys() {
    let mut app = app_with(scenario_backend()).await;
    assert_eq!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), None);
    assert!(app.should_quit);

    let mut app = app_with(scenario_backend()).await;
    app.handle_key(press(KeyCode::Char('q')));
    assert!(app.should_quit);
}

#[tokio::test]
async fn editor_stays_interactive_while_a_save_runs() {
    let backend = scenario_backend();
    let mut app = app_with(backend.clone()).await;
    for code in [KeyCode::Char('c'), KeyCode::Right, KeyCode::Right] {
        assert_eq!(app.handle_key(press(code)), None);
    }
    let connect = app.handle_key(press(KeyCode::Enter)).expect("connect command");
    app.execute(connect).await;

    assert!(app.is_saving());
    assert!(app.session.workflow().unwrap().has_transition(&key("todo"), &key("done")));
    assert!(draw(&mut app).contains("[saving]"));

    keys(&mut app, &[KeyCode::Left]).await;
    assert_eq!(app.session.editor().unwrap().selected(), Some(&key("doing")));
    let reload = app.handle_key(press(KeyCode::Char('r'))).expect("reload command");
    app.execute(reload).await;
    assert_eq!(toast(&app).1, "saving; 1 queued");

    app.settle().await;
    assert_eq!(toast(&app), (ToastLevel::Info, "saved (rev 1)".to_owned()));
    assert_eq!(backend.persisted().len(), 1);
    assert_eq!(app.next_queued(), Some(Command::Reload));
    assert_eq!(app.next_queued(), None);
}
