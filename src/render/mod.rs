// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rendering for workflow diagrams.
//!
//! Renderers produce Unicode text plus a hit index that maps every diagram object to the cells it
//! covers, so the terminal editor can highlight and hit-test without re-deriving geometry.

use std::collections::BTreeMap;

use crate::diagram::DiagramObject;

pub mod canvas;
#[cfg(test)]
mod test_utils;
mod text;
pub mod workflow;

pub use canvas::{Canvas, CanvasError};
pub use workflow::{render_workflow_annotated, render_workflow_unicode, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Writes the target state name on each lane where it fits.
    pub show_edge_labels: bool,
    /// Node labels longer than this are cut with an ellipsis.
    pub max_label_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { show_edge_labels: false, max_label_width: 24 }
    }
}

/// A contiguous span of cells within a single rendered line.
///
/// Coordinates are `(y, x0, x1)` in character-cell indices, inclusive, relative to the rendered
/// text lines.
pub type LineSpan = (usize, usize, usize);

/// Mapping from diagram objects to the cells they occupy.
pub type HitIndex = BTreeMap<DiagramObject, Vec<LineSpan>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRender {
    pub text: String,
    pub hit_index: HitIndex,
}

impl AnnotatedRender {
    /// The object under cell `(x, y)`. Nodes win over edges passing through the same cell.
    pub fn object_at(&self, x: usize, y: usize) -> Option<&DiagramObject> {
        let covers = |spans: &Vec<LineSpan>| {
            spans.iter().any(|&(sy, x0, x1)| sy == y && x0 <= x && x <= x1)
        };

        let mut hit = None;
        for (object, spans) in &self.hit_index {
            if !covers(spans) {
                continue;
            }
            if matches!(object, DiagramObject::Node(_)) {
                return Some(object);
            }
            if hit.is_none() {
                hit = Some(object);
            }
        }
        hit
    }
}

/// Drops or shortens spans that fall outside the (trimmed) text.
pub(crate) fn clamp_hit_index_to_text(hit_index: &mut HitIndex, text: &str) {
    let line_lens = text.split('\n').map(text::text_len).collect::<Vec<_>>();

    hit_index.retain(|_, spans| {
        spans.retain_mut(|(y, x0, x1)| {
            let Some(&len) = line_lens.get(*y) else {
                return false;
            };
            if len == 0 || *x0 >= len {
                return false;
            }
            *x1 = (*x1).min(len - 1);
            *x0 <= *x1
        });
        !spans.is_empty()
    });
}
