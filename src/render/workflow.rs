// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::diagram::{DiagramObject, DiagramProjection};
use crate::layout::{EdgeRoute, LaneSide, WorkflowLayout};
use crate::model::StateKey;

use super::canvas::{
    Canvas, CanvasError, BOX_HORIZONTAL, BOX_VERTICAL, DASHED_HORIZONTAL, DASHED_VERTICAL,
};
use super::text::{centered_offset, text_len, truncate_with_ellipsis};
use super::{clamp_hit_index_to_text, AnnotatedRender, HitIndex, LineSpan, RenderOptions};

const COLUMN_GAP: usize = 3;
const BOX_HEIGHT: usize = 3;
const ARROW_DOWN: char = '▼';
const ARROW_UP: char = '▲';
const SELF_LOOP_MARK: char = '↻';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    UnknownNode { key: StateKey },
    Canvas(CanvasError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { key } => write!(f, "layout references unknown node {key}"),
            Self::Canvas(err) => write!(f, "canvas error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownNode { .. } => None,
            Self::Canvas(err) => Some(err),
        }
    }
}

impl From<CanvasError> for RenderError {
    fn from(value: CanvasError) -> Self {
        Self::Canvas(value)
    }
}

/// Cell geometry derived from a layout.
///
/// Rows, top to bottom: forward lanes (outermost first), one leg row, the `▼` arrow row, the
/// three box rows, the `▲` arrow row, one leg row, backward lanes (innermost first). The lane
/// blocks and their leg/arrow rows are omitted when a side has no edges.
struct Grid {
    box_x: Vec<(usize, usize)>,
    above_lanes: usize,
    below_lanes: usize,
    box_top: usize,
    width: usize,
    height: usize,
}

impl Grid {
    fn new(labels: &[String], layout: &WorkflowLayout) -> Self {
        let mut box_x = Vec::with_capacity(labels.len());
        let mut x = 0;
        for (col, label) in labels.iter().enumerate() {
            let ports = layout
                .port_count(col, LaneSide::Above)
                .max(layout.port_count(col, LaneSide::Below));
            let width = (text_len(label) + 4).max(2 * ports + 3);
            box_x.push((x, x + width - 1));
            x += width + COLUMN_GAP;
        }

        let above_lanes = layout.above_lanes();
        let below_lanes = layout.below_lanes();
        let box_top = if above_lanes == 0 { 0 } else { above_lanes + 2 };
        let below_rows = if below_lanes == 0 { 0 } else { below_lanes + 2 };

        Self {
            box_x,
            above_lanes,
            below_lanes,
            box_top,
            width: x.saturating_sub(COLUMN_GAP),
            height: box_top + BOX_HEIGHT + below_rows,
        }
    }

    fn box_bottom(&self) -> usize {
        self.box_top + BOX_HEIGHT - 1
    }

    fn port_x(&self, col: usize, port: usize) -> usize {
        self.box_x[col].0 + 2 + 2 * port
    }

    fn lane_y(&self, side: LaneSide, lane: usize) -> usize {
        match side {
            LaneSide::Above => self.above_lanes - 1 - lane,
            LaneSide::Below => self.box_bottom() + 3 + lane,
        }
    }

    fn arrow_y(&self, side: LaneSide) -> usize {
        match side {
            LaneSide::Above => self.box_top - 1,
            LaneSide::Below => self.box_bottom() + 1,
        }
    }
}

pub fn render_workflow_unicode(
    projection: &DiagramProjection,
    layout: &WorkflowLayout,
    options: RenderOptions,
) -> Result<String, RenderError> {
    Ok(render_workflow_annotated(projection, layout, options)?.text)
}

/// Renders the diagram and indexes the cells covered by every node and edge.
pub fn render_workflow_annotated(
    projection: &DiagramProjection,
    layout: &WorkflowLayout,
    options: RenderOptions,
) -> Result<AnnotatedRender, RenderError> {
    let labels = layout
        .columns()
        .iter()
        .map(|key| {
            projection
                .node(key)
                .map(|node| truncate_with_ellipsis(node.label(), options.max_label_width))
                .ok_or_else(|| RenderError::UnknownNode { key: key.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if labels.is_empty() {
        return Ok(AnnotatedRender { text: String::new(), hit_index: HitIndex::new() });
    }

    let grid = Grid::new(&labels, layout);
    let mut canvas = Canvas::new(grid.width, grid.height)?;
    let mut hit_index = HitIndex::new();

    for (col, (key, label)) in layout.columns().iter().zip(&labels).enumerate() {
        let (x0, x1) = grid.box_x[col];
        canvas.draw_box(x0, grid.box_top, x1, grid.box_bottom())?;
        let inner = x1 - x0 - 1;
        canvas.write_str(x0 + 1 + centered_offset(text_len(label), inner), grid.box_top + 1, label)?;

        let spans = (grid.box_top..=grid.box_bottom())
            .map(|y| (y, x0, x1))
            .collect::<Vec<_>>();
        hit_index.insert(DiagramObject::Node(key.clone()), spans);
    }

    // Dashed candidates go first so solid strokes drawn later keep their junctions.
    let (pending, solid): (Vec<&EdgeRoute>, Vec<&EdgeRoute>) =
        layout.routes().iter().partition(|r| r.is_pending());
    for route in pending.into_iter().chain(solid) {
        let spans = draw_route(&mut canvas, &grid, route)?;
        hit_index.insert(
            DiagramObject::Edge { from: route.from_key().clone(), to: route.to_key().clone() },
            spans,
        );
    }

    if options.show_edge_labels {
        for route in layout.routes() {
            let Some(edge) = projection
                .edges()
                .iter()
                .find(|e| e.from_key() == route.from_key() && e.to_key() == route.to_key())
            else {
                continue;
            };
            write_edge_label(&mut canvas, &grid, route, edge.label())?;
        }
    }

    for key in layout.self_loops() {
        let Some(col) = layout.column_of(key) else {
            return Err(RenderError::UnknownNode { key: key.clone() });
        };
        let x = grid.box_x[col].1 - 1;
        canvas.set(x, grid.box_top, SELF_LOOP_MARK)?;
        hit_index.insert(
            DiagramObject::Edge { from: key.clone(), to: key.clone() },
            vec![(grid.box_top, x, x)],
        );
    }

    let text = canvas.to_trimmed_string();
    clamp_hit_index_to_text(&mut hit_index, &text);
    Ok(AnnotatedRender { text, hit_index })
}

fn draw_route(
    canvas: &mut Canvas,
    grid: &Grid,
    route: &EdgeRoute,
) -> Result<Vec<LineSpan>, RenderError> {
    let side = route.side();
    let pending = route.is_pending();
    let (h, v) = if pending {
        (DASHED_HORIZONTAL, DASHED_VERTICAL)
    } else {
        (BOX_HORIZONTAL, BOX_VERTICAL)
    };

    let from_x = grid.port_x(route.from_col(), route.from_port());
    let to_x = grid.port_x(route.to_col(), route.to_port());
    let lane_y = grid.lane_y(side, route.lane());
    let arrow_y = grid.arrow_y(side);

    // Solid sources join the box border; dashed ones stop at the arrow row.
    let (src_y0, src_y1, dst_y0, dst_y1) = match side {
        LaneSide::Above => {
            let attach = if pending { arrow_y } else { grid.box_top };
            (lane_y + 1, attach, lane_y + 1, arrow_y - 1)
        }
        LaneSide::Below => {
            let attach = if pending { arrow_y } else { grid.box_bottom() };
            (attach, lane_y - 1, arrow_y + 1, lane_y - 1)
        }
    };

    canvas.hline(from_x, to_x, lane_y, h)?;
    canvas.vline(from_x, src_y0, src_y1, v)?;
    canvas.vline(to_x, dst_y0, dst_y1, v)?;
    canvas.set(to_x, arrow_y, if side == LaneSide::Above { ARROW_DOWN } else { ARROW_UP })?;

    for x in [from_x, to_x] {
        let corner = if pending {
            rounded_corner(side, x == from_x.min(to_x))
        } else {
            BOX_VERTICAL
        };
        canvas.set(x, lane_y, corner)?;
    }

    let mut spans = vec![(lane_y, from_x.min(to_x), from_x.max(to_x))];
    spans.extend((src_y0..=src_y1).map(|y| (y, from_x, from_x)));
    spans.extend((dst_y0..=dst_y1).map(|y| (y, to_x, to_x)));
    spans.push((arrow_y, to_x, to_x));
    spans.sort_unstable();
    Ok(spans)
}

fn rounded_corner(side: LaneSide, left_end: bool) -> char {
    match (side, left_end) {
        (LaneSide::Above, true) => '╭',
        (LaneSide::Above, false) => '╮',
        (LaneSide::Below, true) => '╰',
        (LaneSide::Below, false) => '╯',
    }
}

/// Writes ` label ` centered on the lane when it fits between the corners.
fn write_edge_label(
    canvas: &mut Canvas,
    grid: &Grid,
    route: &EdgeRoute,
    label: &str,
) -> Result<(), CanvasError> {
    let from_x = grid.port_x(route.from_col(), route.from_port());
    let to_x = grid.port_x(route.to_col(), route.to_port());
    let (lo, hi) = (from_x.min(to_x), from_x.max(to_x));
    let room = hi - lo - 1;
    let padded = format!(" {label} ");
    if text_len(&padded) > room {
        return Ok(());
    }

    let y = grid.lane_y(route.side(), route.lane());
    canvas.write_str(lo + 1 + centered_offset(text_len(&padded), room), y, &padded)
}
