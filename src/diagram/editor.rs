// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::layout::{layout_workflow, LayoutError, WorkflowLayout};
use crate::model::{StateKey, Workflow};
use crate::render::{render_workflow_annotated, AnnotatedRender, RenderError, RenderOptions};

use super::projection::{project_workflow, DiagramObject, DiagramProjection};

/// User intent raised by the diagram. The session controller is the only listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramEvent {
    StateSelected(StateKey),
    ConnectRequested { from: StateKey, to: StateKey },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    Layout(LayoutError),
    Render(RenderError),
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout error: {err}"),
            Self::Render(err) => write!(f, "render error: {err}"),
        }
    }
}

impl std::error::Error for DiagramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<LayoutError> for DiagramError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<RenderError> for DiagramError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

/// Interactive view over a workflow.
///
/// Owns the projection, layout and rendered text. Reads the model on [`DiagramEditor::sync`] and
/// never writes to it; every change the user asks for leaves as a [`DiagramEvent`].
#[derive(Debug, Clone)]
pub struct DiagramEditor {
    options: RenderOptions,
    projection: DiagramProjection,
    layout: WorkflowLayout,
    render: AnnotatedRender,
    selected: Option<StateKey>,
    connect_from: Option<StateKey>,
}

impl DiagramEditor {
    pub fn new(workflow: &Workflow, options: RenderOptions) -> Result<Self, DiagramError> {
        let projection = project_workflow(workflow);
        let layout = layout_workflow(&projection)?;
        let render = render_workflow_annotated(&projection, &layout, options)?;
        let selected = layout.columns().first().cloned();

        Ok(Self {
            options,
            projection,
            layout,
            render,
            selected,
            connect_from: None,
        })
    }

    /// Rebuilds projection, layout and render from the workflow.
    ///
    /// Candidate edges and connect mode are dropped. The selection survives if its state does.
    pub fn sync(&mut self, workflow: &Workflow) -> Result<(), DiagramError> {
        let mut next = Self::new(workflow, self.options)?;
        if let Some(selected) = self.selected.take() {
            if next.layout.column_of(&selected).is_some() {
                next.selected = Some(selected);
            }
        }
        *self = next;
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.render.text
    }

    pub fn render(&self) -> &AnnotatedRender {
        &self.render
    }

    pub fn projection(&self) -> &DiagramProjection {
        &self.projection
    }

    pub fn layout(&self) -> &WorkflowLayout {
        &self.layout
    }

    pub fn selected(&self) -> Option<&StateKey> {
        self.selected.as_ref()
    }

    /// The source of an in-progress connect gesture.
    pub fn connect_source(&self) -> Option<&StateKey> {
        self.connect_from.as_ref()
    }

    pub fn node_at(&self, x: usize, y: usize) -> Option<&StateKey> {
        match self.render.object_at(x, y)? {
            DiagramObject::Node(key) => Some(key),
            DiagramObject::Edge { .. } => None,
        }
    }

    /// Hit-tests a click. Selects the node under the cursor, or completes a pending connection.
    pub fn click(&mut self, x: usize, y: usize) -> Result<Option<DiagramEvent>, DiagramError> {
        let Some(key) = self.node_at(x, y).cloned() else {
            return Ok(None);
        };
        if self.connect_from.is_some() {
            return self.complete_connect(&key);
        }
        Ok(self.select(&key))
    }

    pub fn select(&mut self, key: &StateKey) -> Option<DiagramEvent> {
        self.layout.column_of(key)?;
        self.selected = Some(key.clone());
        Some(DiagramEvent::StateSelected(key.clone()))
    }

    /// Emits a selection event for the current keyboard selection.
    pub fn activate(&mut self) -> Result<Option<DiagramEvent>, DiagramError> {
        let Some(key) = self.selected.clone() else {
            return Ok(None);
        };
        if self.connect_from.is_some() {
            return self.complete_connect(&key);
        }
        Ok(self.select(&key))
    }

    pub fn select_next(&mut self) -> Option<&StateKey> {
        self.step_selection(1)
    }

    pub fn select_prev(&mut self) -> Option<&StateKey> {
        self.step_selection(-1)
    }

    fn step_selection(&mut self, step: isize) -> Option<&StateKey> {
        let columns = self.layout.columns();
        if columns.is_empty() {
            return None;
        }

        let current = self
            .selected
            .as_ref()
            .and_then(|key| self.layout.column_of(key));
        let next = match current {
            Some(col) => col.checked_add_signed(step).unwrap_or(0).min(columns.len() - 1),
            None => 0,
        };
        self.selected = Some(columns[next].clone());
        self.selected.as_ref()
    }

    pub fn begin_connect(&mut self, from: &StateKey) -> bool {
        if self.layout.column_of(from).is_none() {
            return false;
        }
        self.connect_from = Some(from.clone());
        true
    }

    pub fn cancel_connect(&mut self) {
        self.connect_from = None;
    }

    /// Finishes a connect gesture at `to`.
    ///
    /// Connecting a state to itself or re-adding an existing edge ends the gesture without an
    /// event. Otherwise a dashed candidate edge is shown until the next [`DiagramEditor::sync`].
    pub fn complete_connect(&mut self, to: &StateKey) -> Result<Option<DiagramEvent>, DiagramError> {
        let Some(from) = self.connect_from.take() else {
            return Ok(None);
        };
        if &from == to || !self.projection.push_pending_edge(&from, to) {
            return Ok(None);
        }

        self.layout = layout_workflow(&self.projection)?;
        self.render = render_workflow_annotated(&self.projection, &self.layout, self.options)?;
        Ok(Some(DiagramEvent::ConnectRequested { from, to: to.clone() }))
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{DiagramEditor, DiagramEvent};
    use crate::diagram::DiagramObject;
    use crate::model::fixtures::{kanban_workflow, key, scenario_workflow};
    use crate::model::Workflow;
    use crate::render::RenderOptions;

    #[fixture]
    fn workflow() -> Workflow {
        scenario_workflow()
    }

    #[fixture]
    fn editor(workflow: Workflow) -> DiagramEditor {
        DiagramEditor::new(&workflow, RenderOptions::default()).expect("editor")
    }

    fn node_cell(editor: &DiagramEditor, value: &str) -> (usize, usize) {
        let spans = editor
            .render()
            .hit_index
            .get(&DiagramObject::Node(key(value)))
            .expect("node spans");
        let (y, x0, _) = spans[1];
        (x0 + 1, y)
    }

    #[rstest]
    fn click_on_node_emits_state_selected(mut editor: DiagramEditor) {
        let (x, y) = node_cell(&editor, "doing");
        assert_eq!(
            editor.click(x, y).expect("click"),
            Some(DiagramEvent::StateSelected(key("doing")))
        );
        assert_eq!(editor.selected(), Some(&key("doing")));
    }

    #[rstest]
    fn click_on_empty_cell_is_ignored(mut editor: DiagramEditor) {
        assert_eq!(editor.click(500, 500).expect("click"), None);
    }

    #[rstest]
    fn connect_adds_a_pending_edge_and_emits_request(mut editor: DiagramEditor) {
        assert!(editor.begin_connect(&key("done")));
        let (x, y) = node_cell(&editor, "todo");

        let event = editor.click(x, y).expect("click");

        assert_eq!(event, Some(DiagramEvent::ConnectRequested { from: key("done"), to: key("todo") }));
        assert!(editor.connect_source().is_none());
        let pending = editor.projection().edges().last().expect("pending");
        assert!(pending.is_pending());
        assert!(editor.text().contains('┄'));
    }

    #[rstest]
    fn self_connection_is_ignored(mut editor: DiagramEditor) {
        editor.begin_connect(&key("todo"));
        assert_eq!(editor.complete_connect(&key("todo")).expect("connect"), None);
        assert!(editor.connect_source().is_none());
        assert!(editor.projection().edges().iter().all(|e| !e.is_pending()));
    }

    #[rstest]
    fn duplicate_connection_is_a_no_op(mut editor: DiagramEditor) {
        let before = editor.text().to_owned();
        editor.begin_connect(&key("todo"));
        assert_eq!(editor.complete_connect(&key("doing")).expect("connect"), None);
        assert_eq!(editor.text(), before);
    }

    #[rstest]
    fn sync_drops_candidates_and_keeps_selection(mut editor: DiagramEditor, workflow: Workflow) {
        editor.select(&key("done"));
        editor.begin_connect(&key("done"));
        editor.complete_connect(&key("todo")).expect("connect");

        editor.sync(&workflow).expect("sync");

        assert!(editor.projection().edges().iter().all(|e| !e.is_pending()));
        assert_eq!(editor.selected(), Some(&key("done")));
    }

    #[test]
    fn keyboard_navigation_follows_layout_order() {
        let mut editor =
            DiagramEditor::new(&kanban_workflow(), RenderOptions::default()).expect("editor");
        assert_eq!(editor.selected(), Some(&key("backlog")));

        assert_eq!(editor.select_prev(), Some(&key("backlog")));
        assert_eq!(editor.select_next(), Some(&key("todo")));
        for _ in 0..10 {
            editor.select_next();
        }
        assert_eq!(editor.selected(), Some(&key("done")));
        assert_eq!(
            editor.activate().expect("activate"),
            Some(DiagramEvent::StateSelected(key("done")))
        );
    }

    #[test]
    fn activate_in_connect_mode_completes_the_gesture() {
        let mut editor =
            DiagramEditor::new(&kanban_workflow(), RenderOptions::default()).expect("editor");
        editor.select(&key("done"));
        editor.begin_connect(&key("done"));
        editor.select_prev();

        assert_eq!(
            editor.activate().expect("activate"),
            Some(DiagramEvent::ConnectRequested { from: key("done"), to: key("review") })
        );
    }
}
