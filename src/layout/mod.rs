// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout for workflow diagrams.
//!
//! Computes node columns, edge lanes and per-node ports on an abstract grid. The renderer turns
//! the grid into character cells.

pub mod workflow;

pub use workflow::{layout_workflow, EdgeRoute, LaneSide, LayoutError, WorkflowLayout};
