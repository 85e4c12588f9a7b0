// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Interactive terminal editor.
//!
//! The event loop is synchronous. Key and mouse input is turned into a [`Command`]; edits are
//! merged locally at once and their save is spawned on the runtime, so the editor keeps drawing
//! and handling input while the backend works. Commands that need the backend wait in a queue
//! until the running save has been settled, which keeps edits strictly ordered.

use std::collections::VecDeque;
use std::error::Error;
use std::io;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::diagram::DiagramEvent;
use crate::model::StateKey;
use crate::session::{
    MergeOutcome, PendingPersist, SessionError, Staged, WorkflowBackend, WorkflowSession,
};
use crate::store::BackendError;

mod chrome;
#[cfg(test)]
mod tests;
mod theme;

use theme::TuiTheme;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SAVING_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs the editor over an already loaded session until the user quits.
///
/// `runtime` must be able to run spawned tasks while this thread waits for input, i.e. a
/// multi-thread runtime.
pub fn run<B>(session: WorkflowSession<B>, runtime: &Runtime) -> Result<(), Box<dyn Error>>
where
    B: WorkflowBackend + Clone + Send + Sync + 'static,
{
    let theme = TuiTheme::from_env()?;
    let mut app = App::new(session, theme);
    let mut terminal = TerminalSession::new()?;

    loop {
        if app.save_finished() {
            runtime.block_on(app.settle());
        }
        while let Some(command) = app.next_queued() {
            runtime.block_on(app.execute(command));
        }

        terminal.draw(|frame| chrome::draw(frame, &mut app))?;
        if app.should_quit {
            break;
        }
        let interval = if app.is_saving() { SAVING_POLL_INTERVAL } else { POLL_INTERVAL };
        if !event::poll(interval)? {
            continue;
        }

        let command = match event::read()? {
            Event::Key(key) => app.handle_key(key),
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => None,
        };
        if let Some(command) = command {
            runtime.block_on(app.execute(command));
        }
    }

    // A save already sent is waited for; queued commands are dropped.
    runtime.block_on(app.settle());
    Ok(())
}

/// Work that has to go through the session's async API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Diagram(DiagramEvent),
    SavePanel,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Diagram,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Toast {
    level: ToastLevel,
    message: String,
}

/// A save running on the runtime.
struct InFlight {
    pending: PendingPersist,
    handle: JoinHandle<Result<(), BackendError>>,
}

struct App<B> {
    session: WorkflowSession<B>,
    theme: TuiTheme,
    focus: Focus,
    panel_cursor: usize,
    scroll_x: u16,
    scroll_y: u16,
    /// Inner diagram area from the last frame, used to map mouse clicks to canvas cells.
    diagram_area: Rect,
    panel_area: Option<Rect>,
    toast: Option<Toast>,
    in_flight: Option<InFlight>,
    queued: VecDeque<Command>,
    should_quit: bool,
}

impl<B: WorkflowBackend> App<B> {
    fn new(session: WorkflowSession<B>, theme: TuiTheme) -> Self {
        Self {
            session,
            theme,
            focus: Focus::Diagram,
            panel_cursor: 0,
            scroll_x: 0,
            scroll_y: 0,
            diagram_area: Rect::default(),
            panel_area: None,
            toast: None,
            in_flight: None,
            queued: VecDeque::new(),
            should_quit: false,
        }
    }

    fn set_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast { level, message: message.into() });
    }

    /// States listed in the panel, in diagram column order.
    fn panel_targets(&self) -> Vec<StateKey> {
        self.session
            .editor()
            .map(|editor| editor.layout().columns().to_vec())
            .unwrap_or_default()
    }

    fn state_name(&self, key: &StateKey) -> String {
        self.session
            .workflow()
            .and_then(|workflow| workflow.lookup_state(key))
            .map_or_else(|| key.to_string(), |state| state.name().to_owned())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('r') => Some(Command::Reload),
            KeyCode::Char('s') => Some(Command::SavePanel),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Diagram if self.session.panel().is_some() => Focus::Panel,
                    _ => Focus::Diagram,
                };
                None
            }
            KeyCode::Esc => {
                self.cancel();
                None
            }
            _ => match self.focus {
                Focus::Diagram => self.handle_diagram_key(key.code),
                Focus::Panel => self.handle_panel_key(key.code),
            },
        }
    }

    fn handle_diagram_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.session.editor_mut()?.select_prev();
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.session.editor_mut()?.select_next();
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_y = self.scroll_y.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_y = self.scroll_y.saturating_add(1);
                None
            }
            KeyCode::Enter => match self.session.editor_mut()?.activate() {
                Ok(event) => event.map(Command::Diagram),
                Err(err) => {
                    self.set_toast(ToastLevel::Error, err.to_string());
                    None
                }
            },
            KeyCode::Char('c') => {
                self.begin_connect();
                None
            }
            KeyCode::Char('<') => {
                self.move_selected(-1);
                None
            }
            KeyCode::Char('>') => {
                self.move_selected(1);
                None
            }
            _ => None,
        }
    }

    fn handle_panel_key(&mut self, code: KeyCode) -> Option<Command> {
        let count = self.panel_targets().len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.panel_cursor = self.panel_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.panel_cursor + 1 < count {
                    self.panel_cursor += 1;
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_at_cursor();
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Command> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }

        if let Some(panel_area) = self.panel_area {
            if rect_contains(panel_area, mouse.column, mouse.row) {
                let row = mouse.row.checked_sub(panel_area.y + chrome::PANEL_LIST_TOP)?;
                if usize::from(row) < self.panel_targets().len() {
                    self.focus = Focus::Panel;
                    self.panel_cursor = usize::from(row);
                    self.toggle_at_cursor();
                }
                return None;
            }
        }

        if !rect_contains(self.diagram_area, mouse.column, mouse.row) {
            return None;
        }
        self.focus = Focus::Diagram;
        let x = usize::from(mouse.column - self.diagram_area.x + self.scroll_x);
        let y = usize::from(mouse.row - self.diagram_area.y + self.scroll_y);
        match self.session.editor_mut()?.click(x, y) {
            Ok(event) => event.map(Command::Diagram),
            Err(err) => {
                self.set_toast(ToastLevel::Error, err.to_string());
                None
            }
        }
    }

    /// Esc leaves connect mode first, then closes the panel.
    fn cancel(&mut self) {
        if let Some(editor) = self.session.editor_mut() {
            if editor.connect_source().is_some() {
                editor.cancel_connect();
                self.set_toast(ToastLevel::Info, "connect cancelled");
                return;
            }
        }
        if self.session.panel().is_some() {
            self.session.close_panel();
            self.focus = Focus::Diagram;
        }
    }

    fn begin_connect(&mut self) {
        let Some(editor) = self.session.editor_mut() else {
            return;
        };
        let Some(from) = editor.selected().cloned() else {
            return;
        };
        if editor.begin_connect(&from) {
            let name = self.state_name(&from);
            self.set_toast(ToastLevel::Info, format!("connect from {name}: pick a target and press Enter"));
        }
    }

    fn toggle_at_cursor(&mut self) {
        let Some(target) = self.panel_targets().get(self.panel_cursor).cloned() else {
            return;
        };
        if let Err(err) = self.session.toggle_panel_target(&target) {
            self.set_toast(ToastLevel::Error, err.to_string());
        }
    }

    /// Swaps the selected state's order with its neighbor in `direction`.
    fn move_selected(&mut self, direction: isize) {
        let Some(editor) = self.session.editor() else {
            return;
        };
        let Some(selected) = editor.selected().cloned() else {
            return;
        };
        let columns = editor.layout().columns();
        let Some(neighbor) = editor
            .layout()
            .column_of(&selected)
            .and_then(|col| col.checked_add_signed(direction))
            .and_then(|col| columns.get(col))
            .cloned()
        else {
            return;
        };
        let Some(workflow) = self.session.workflow() else {
            return;
        };
        let (Some(own), Some(other)) = (
            workflow.lookup_state(&selected).map(|state| state.order()),
            workflow.lookup_state(&neighbor).map(|state| state.order()),
        ) else {
            return;
        };

        let target = if own == other { other + direction as i64 } else { other };
        let result = self
            .session
            .set_state_order(&selected, target)
            .and_then(|()| self.session.set_state_order(&neighbor, own));
        match result {
            Ok(()) => {
                let name = self.state_name(&selected);
                self.set_toast(ToastLevel::Info, format!("moved {name}; the next save sends the new order"));
            }
            Err(err) => self.set_toast(ToastLevel::Error, err.to_string()),
        }
    }

    fn report_outcome(&mut self, outcome: MergeOutcome) {
        let rev = self.session.workflow().map_or(0, |workflow| workflow.rev());
        match outcome {
            MergeOutcome::Persisted => self.set_toast(ToastLevel::Info, format!("saved (rev {rev})")),
            MergeOutcome::Unchanged => self.set_toast(ToastLevel::Info, "no changes"),
            MergeOutcome::PersistFailed => self.set_toast(
                ToastLevel::Warning,
                "save failed; local edit kept (r reloads the remote copy)",
            ),
        }
    }

    fn report_error(&mut self, err: SessionError) {
        let level = match err {
            SessionError::StalePanel { .. } => ToastLevel::Warning,
            _ => ToastLevel::Error,
        };
        self.set_toast(level, err.to_string());
    }
}

impl<B> App<B>
where
    B: WorkflowBackend + Clone + Send + Sync + 'static,
{
    async fn execute(&mut self, command: Command) {
        if self.in_flight.is_some() {
            debug!(?command, "queued behind a running save");
            self.queued.push_back(command);
            self.set_toast(ToastLevel::Info, format!("saving; {} queued", self.queued.len()));
            return;
        }

        debug!(?command, "tui command");
        match command {
            Command::Diagram(event) => {
                let opened = match &event {
                    DiagramEvent::StateSelected(key) => Some(key.clone()),
                    DiagramEvent::ConnectRequested { .. } => None,
                };
                match self.session.stage_event(event) {
                    Ok(Some(staged)) => self.start_save(staged),
                    Ok(None) => {
                        if let Some(key) = opened {
                            self.focus = Focus::Panel;
                            self.panel_cursor = 0;
                            let name = self.state_name(&key);
                            self.set_toast(ToastLevel::Info, format!("editing transitions from {name}"));
                        }
                    }
                    Err(err) => self.report_error(err),
                }
            }
            Command::SavePanel => match self.session.stage_panel_save() {
                Ok(staged) => self.start_save(staged),
                Err(err) => self.report_error(err),
            },
            Command::Reload => match self.session.reload().await {
                Ok(()) => {
                    self.focus = Focus::Diagram;
                    self.panel_cursor = 0;
                    let name = self.session.workflow().map(|w| w.name().to_owned()).unwrap_or_default();
                    self.set_toast(ToastLevel::Info, format!("reloaded {name}"));
                }
                Err(err) => self.report_error(err),
            },
        }
    }

    /// Sends a staged edit to the backend without waiting for the answer.
    fn start_save(&mut self, staged: Staged) {
        let pending = match staged {
            Staged::Unchanged => return self.report_outcome(MergeOutcome::Unchanged),
            Staged::Persist(pending) => pending,
        };
        let backend = self.session.backend().clone();
        let workflow_id = pending.workflow_id.clone();
        let payload = pending.payload.clone();
        let handle = tokio::spawn(async move {
            backend.persist_transitions(&workflow_id, &payload).await
        });
        self.set_toast(ToastLevel::Info, format!("saving (rev {})", pending.rev));
        self.in_flight = Some(InFlight { pending, handle });
    }

    fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    fn save_finished(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|save| save.handle.is_finished())
    }

    fn next_queued(&mut self) -> Option<Command> {
        if self.is_saving() {
            return None;
        }
        self.queued.pop_front()
    }

    /// Waits for the running save, if any, and reports how it went.
    async fn settle(&mut self) {
        let Some(InFlight { pending, handle }) = self.in_flight.take() else {
            return;
        };
        let result = handle
            .await
            .unwrap_or_else(|err| Err(BackendError::Interrupted { message: err.to_string() }));
        let outcome = self.session.finish_persist(&pending, result);
        self.report_outcome(outcome);
    }
}

fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}
