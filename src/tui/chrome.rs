// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout, panel and footer drawing for the editor.

use std::collections::BTreeSet;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::diagram::{DiagramEditor, DiagramObject};
use crate::render::LineSpan;
use crate::session::WorkflowBackend;

use super::theme::TuiTheme;
use super::{App, Focus, ToastLevel};

const PANEL_WIDTH: u16 = 36;
/// Rows between the panel's top edge and its first target: border, counts, blank line.
pub(super) const PANEL_LIST_TOP: u16 = 3;

pub(super) fn draw<B: WorkflowBackend>(frame: &mut Frame<'_>, app: &mut App<B>) {
    let area = frame.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(area);

    if app.session.panel().is_some() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
            .split(rows[0]);
        draw_diagram(frame, app, body[0]);
        app.panel_area = Some(body[1]);
        draw_panel(frame, app, body[1]);
    } else {
        app.panel_area = None;
        if app.focus == Focus::Panel {
            app.focus = Focus::Diagram;
        }
        draw_diagram(frame, app, rows[0]);
    }

    draw_footer(frame, app, rows[1]);
}

fn draw_diagram<B: WorkflowBackend>(frame: &mut Frame<'_>, app: &mut App<B>, area: Rect) {
    let title = match app.session.workflow() {
        Some(workflow) => format!(" {} ", workflow.name()),
        None => " kanflow ".to_owned(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(app.theme.panel_border_style(app.focus == Focus::Diagram))
        .style(app.theme.base_style());
    let inner = block.inner(area);
    app.diagram_area = inner;
    scroll_to_selection(app, inner);

    let lines = match app.session.editor() {
        Some(editor) => styled_diagram_lines(editor, &app.theme),
        None => vec![Line::styled("no workflow loaded", app.theme.muted_style())],
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.scroll_y, app.scroll_x));
    frame.render_widget(paragraph, area);
}

/// Keeps the selected node inside the visible part of the canvas.
fn scroll_to_selection<B: WorkflowBackend>(app: &mut App<B>, viewport: Rect) {
    let Some(editor) = app.session.editor() else {
        return;
    };
    let Some(selected) = editor.selected() else {
        return;
    };
    let Some(spans) = editor.render().hit_index.get(&DiagramObject::Node(selected.clone())) else {
        return;
    };
    let Some((x0, x1, y0, y1)) = span_bounds(spans) else {
        return;
    };

    let width = usize::from(viewport.width.max(1));
    let height = usize::from(viewport.height.max(1));
    let mut scroll_x = usize::from(app.scroll_x);
    let mut scroll_y = usize::from(app.scroll_y);
    if x0 < scroll_x {
        scroll_x = x0;
    } else if x1 >= scroll_x + width {
        scroll_x = (x1 + 1).saturating_sub(width).min(x0);
    }
    if y0 < scroll_y {
        scroll_y = y0;
    } else if y1 >= scroll_y + height {
        scroll_y = (y1 + 1).saturating_sub(height).min(y0);
    }
    app.scroll_x = u16::try_from(scroll_x).unwrap_or(u16::MAX);
    app.scroll_y = u16::try_from(scroll_y).unwrap_or(u16::MAX);
}

fn span_bounds(spans: &[LineSpan]) -> Option<(usize, usize, usize, usize)> {
    let x0 = spans.iter().map(|&(_, x0, _)| x0).min()?;
    let x1 = spans.iter().map(|&(_, _, x1)| x1).max()?;
    let y0 = spans.iter().map(|&(y, _, _)| y).min()?;
    let y1 = spans.iter().map(|&(y, _, _)| y).max()?;
    Some((x0, x1, y0, y1))
}

/// Colors the rendered text cell by cell from the hit index, then merges equal runs into spans.
///
/// Paint order: candidate edges, nodes in their state color, the connect source, the selection.
pub(super) fn styled_diagram_lines(editor: &DiagramEditor, theme: &TuiTheme) -> Vec<Line<'static>> {
    let text = editor.text();
    let mut styles: Vec<Vec<Style>> = text
        .split('\n')
        .map(|line| vec![theme.base_style(); line.chars().count()])
        .collect();
    let mut paint = |spans: &[LineSpan], style: Style| {
        for &(y, x0, x1) in spans {
            let Some(row) = styles.get_mut(y) else {
                continue;
            };
            for cell in row.iter_mut().take(x1 + 1).skip(x0) {
                *cell = style;
            }
        }
    };

    let projection = editor.projection();
    let hit_index = &editor.render().hit_index;
    let pending: BTreeSet<_> = projection
        .edges()
        .iter()
        .filter(|edge| edge.is_pending())
        .map(|edge| edge.object())
        .collect();
    for (object, spans) in hit_index {
        if pending.contains(object) {
            paint(spans, theme.pending_edge_style());
        }
    }
    for (object, spans) in hit_index {
        if let DiagramObject::Node(key) = object {
            if let Some(node) = projection.node(key) {
                paint(spans, theme.state_style(node.color()));
            }
        }
    }
    if let Some(source) = editor.connect_source() {
        if let Some(spans) = hit_index.get(&DiagramObject::Node(source.clone())) {
            paint(spans, theme.connect_source_style());
        }
    }
    if let Some(selected) = editor.selected() {
        if let Some(spans) = hit_index.get(&DiagramObject::Node(selected.clone())) {
            paint(spans, theme.selection_style());
        }
    }

    text.split('\n')
        .zip(styles)
        .map(|(line, row)| {
            let mut spans = Vec::new();
            let mut run = String::new();
            let mut current: Option<Style> = None;
            for (ch, style) in line.chars().zip(row) {
                if current != Some(style) {
                    if let Some(previous) = current {
                        spans.push(Span::styled(std::mem::take(&mut run), previous));
                    }
                    current = Some(style);
                }
                run.push(ch);
            }
            if let Some(style) = current {
                spans.push(Span::styled(run, style));
            }
            Line::from(spans)
        })
        .collect()
}

fn draw_panel<B: WorkflowBackend>(frame: &mut Frame<'_>, app: &App<B>, area: Rect) {
    let (Some(panel), Some(workflow)) = (app.session.panel(), app.session.workflow()) else {
        return;
    };
    let theme = &app.theme;
    let node_key = panel.node_key();
    let dirty = if panel.is_dirty() { " *" } else { "" };
    let title = format!(" From: {}{dirty} ", app.state_name(node_key));

    let mut counts = vec![Span::styled(
        format!(
            "out {} / in {}",
            panel.outgoing().len(),
            workflow.incoming_of(node_key).len()
        ),
        theme.muted_style(),
    )];
    if workflow.is_fully_connected(node_key) {
        counts.push(Span::styled("  fully connected", theme.connected_style()));
    }

    let mut lines = vec![Line::from(counts), Line::default()];
    for (idx, key) in app.panel_targets().iter().enumerate() {
        let checked = panel.targets(key);
        let marker = if checked { "[x]" } else { "[ ]" };
        let suffix = if key == node_key { " (self)" } else { "" };
        let style = if idx == app.panel_cursor && app.focus == Focus::Panel {
            theme.selection_style()
        } else if checked {
            theme.connected_style()
        } else {
            theme.base_style()
        };
        lines.push(Line::styled(format!("{marker} {}{suffix}", app.state_name(key)), style));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(theme.panel_border_style(app.focus == Focus::Panel))
        .style(theme.base_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer<B: WorkflowBackend>(frame: &mut Frame<'_>, app: &App<B>, area: Rect) {
    let theme = &app.theme;
    let summary = match app.session.summary() {
        Some(summary) => summary.to_string(),
        None => "no workflow loaded".to_owned(),
    };
    let mut status = vec![Span::styled(summary, theme.base_style())];
    if let Some(toast) = &app.toast {
        let style = match toast.level {
            ToastLevel::Info => theme.base_style(),
            ToastLevel::Warning => theme.warning_style(),
            ToastLevel::Error => theme.error_style(),
        };
        status.push(Span::styled(" │ ", theme.muted_style()));
        status.push(Span::styled(toast.message.clone(), style));
    } else if let Some(warning) = app.session.warnings().last() {
        status.push(Span::styled(" │ ", theme.muted_style()));
        status.push(Span::styled(warning.to_string(), theme.warning_style()));
    }

    let lines = vec![
        Line::from(status),
        Line::styled(key_hints(app), theme.muted_style()),
    ];
    frame.render_widget(Paragraph::new(lines).style(theme.base_style()), area);
}

fn key_hints<B: WorkflowBackend>(app: &App<B>) -> &'static str {
    let connecting = app
        .session
        .editor()
        .is_some_and(|editor| editor.connect_source().is_some());
    if connecting {
        return "←/→ target  ⏎ connect  esc cancel";
    }
    match app.focus {
        Focus::Diagram => "←/→ select  ⏎ open  c connect  </> move  tab panel  s save  r reload  q quit",
        Focus::Panel => "↑/↓ move  space toggle  s save  esc close  tab diagram  q quit",
    }
}
