// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::diagram::DiagramProjection;
use crate::model::StateKey;

/// Which side of the node row an edge lane runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneSide {
    /// Forward edges (left to right).
    Above,
    /// Backward edges (right to left).
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRoute {
    from: StateKey,
    to: StateKey,
    from_col: usize,
    to_col: usize,
    side: LaneSide,
    lane: usize,
    from_port: usize,
    to_port: usize,
    pending: bool,
}

impl EdgeRoute {
    pub fn from_key(&self) -> &StateKey {
        &self.from
    }

    pub fn to_key(&self) -> &StateKey {
        &self.to
    }

    pub fn from_col(&self) -> usize {
        self.from_col
    }

    pub fn to_col(&self) -> usize {
        self.to_col
    }

    pub fn side(&self) -> LaneSide {
        self.side
    }

    /// Lane index counted outwards from the node row, starting at 0.
    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn from_port(&self) -> usize {
        self.from_port
    }

    pub fn to_port(&self) -> usize {
        self.to_port
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn span(&self) -> (usize, usize) {
        (self.from_col.min(self.to_col), self.from_col.max(self.to_col))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowLayout {
    columns: Vec<StateKey>,
    column_of: BTreeMap<StateKey, usize>,
    routes: Vec<EdgeRoute>,
    self_loops: Vec<StateKey>,
    port_counts: BTreeMap<(usize, LaneSide), usize>,
    above_lanes: usize,
    below_lanes: usize,
}

impl WorkflowLayout {
    /// Node keys left to right.
    pub fn columns(&self) -> &[StateKey] {
        &self.columns
    }

    pub fn column_of(&self, key: &StateKey) -> Option<usize> {
        self.column_of.get(key).copied()
    }

    pub fn routes(&self) -> &[EdgeRoute] {
        &self.routes
    }

    pub fn self_loops(&self) -> &[StateKey] {
        &self.self_loops
    }

    pub fn port_count(&self, col: usize, side: LaneSide) -> usize {
        self.port_counts.get(&(col, side)).copied().unwrap_or(0)
    }

    pub fn above_lanes(&self) -> usize {
        self.above_lanes
    }

    pub fn below_lanes(&self) -> usize {
        self.below_lanes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    UnknownNode { from: StateKey, to: StateKey, key: StateKey },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode { from, to, key } => {
                write!(f, "edge {from}->{to} references unknown node {key}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Deterministic single-row layout for a workflow diagram.
///
/// Baseline grid:
/// - columns: nodes ranked by `(order, index in the projection)`
/// - lanes: forward edges above the row, backward edges below, assigned greedily by
///   `(span length, leftmost column, edge index)` so overlapping spans never share a lane
/// - ports: per node side, left-going edges first, then right-going, farther targets outermost
pub fn layout_workflow(projection: &DiagramProjection) -> Result<WorkflowLayout, LayoutError> {
    let mut ranked = projection.nodes().iter().enumerate().collect::<Vec<_>>();
    ranked.sort_by_key(|(idx, node)| (node.order(), *idx));

    let columns = ranked
        .into_iter()
        .map(|(_, node)| node.key().clone())
        .collect::<Vec<_>>();
    let column_of = columns
        .iter()
        .enumerate()
        .map(|(col, key)| (key.clone(), col))
        .collect::<BTreeMap<_, _>>();

    let mut routes = Vec::<EdgeRoute>::new();
    let mut self_loops = Vec::<StateKey>::new();
    for edge in projection.edges() {
        let lookup = |key: &StateKey| {
            column_of.get(key).copied().ok_or_else(|| LayoutError::UnknownNode {
                from: edge.from_key().clone(),
                to: edge.to_key().clone(),
                key: key.clone(),
            })
        };
        let from_col = lookup(edge.from_key())?;
        let to_col = lookup(edge.to_key())?;

        if from_col == to_col {
            if !self_loops.contains(edge.from_key()) {
                self_loops.push(edge.from_key().clone());
            }
            continue;
        }

        routes.push(EdgeRoute {
            from: edge.from_key().clone(),
            to: edge.to_key().clone(),
            from_col,
            to_col,
            side: if from_col < to_col { LaneSide::Above } else { LaneSide::Below },
            lane: 0,
            from_port: 0,
            to_port: 0,
            pending: edge.is_pending(),
        });
    }

    let above_lanes = assign_lanes(&mut routes, LaneSide::Above);
    let below_lanes = assign_lanes(&mut routes, LaneSide::Below);
    let port_counts = assign_ports(&mut routes);

    Ok(WorkflowLayout {
        columns,
        column_of,
        routes,
        self_loops,
        port_counts,
        above_lanes,
        below_lanes,
    })
}

fn assign_lanes(routes: &mut [EdgeRoute], side: LaneSide) -> usize {
    let mut order = routes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.side == side)
        .map(|(idx, r)| {
            let (lo, hi) = r.span();
            (hi - lo, lo, idx)
        })
        .collect::<Vec<_>>();
    order.sort_unstable();

    // Occupied column spans per lane; spans are inclusive so edges sharing a node never share a lane.
    let mut lanes = Vec::<Vec<(usize, usize)>>::new();
    for (_, _, idx) in order {
        let (lo, hi) = routes[idx].span();
        let free = lanes
            .iter()
            .position(|taken| taken.iter().all(|&(a, b)| hi < a || b < lo));
        let lane = match free {
            Some(lane) => lane,
            None => {
                lanes.push(Vec::new());
                lanes.len() - 1
            }
        };
        lanes[lane].push((lo, hi));
        routes[idx].lane = lane;
    }

    lanes.len()
}

fn assign_ports(routes: &mut [EdgeRoute]) -> BTreeMap<(usize, LaneSide), usize> {
    // (node col, side) -> [(left-going?, other col, route idx, is source)]
    let mut endpoints = BTreeMap::<(usize, LaneSide), Vec<(bool, Reverse<usize>, usize, bool)>>::new();
    for (idx, route) in routes.iter().enumerate() {
        endpoints.entry((route.from_col, route.side)).or_default().push((
            route.to_col < route.from_col,
            Reverse(route.to_col),
            idx,
            true,
        ));
        endpoints.entry((route.to_col, route.side)).or_default().push((
            route.from_col < route.to_col,
            Reverse(route.from_col),
            idx,
            false,
        ));
    }

    let mut counts = BTreeMap::new();
    for (slot, mut ends) in endpoints {
        // Left-going ends sort first so they take the leftmost ports.
        ends.sort_unstable_by_key(|&(left, other, idx, source)| (!left, other, idx, source));
        for (port, &(_, _, idx, is_source)) in ends.iter().enumerate() {
            if is_source {
                routes[idx].from_port = port;
            } else {
                routes[idx].to_port = port;
            }
        }
        counts.insert(slot, ends.len());
    }

    counts
}
