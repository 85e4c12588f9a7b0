// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram view of a workflow: a read-only projection of the model plus an editor that turns
//! pointer and keyboard gestures into [`DiagramEvent`]s.

pub mod editor;
pub mod projection;

pub use editor::{DiagramEditor, DiagramError, DiagramEvent};
pub use projection::{
    project_workflow, DiagramEdge, DiagramNode, DiagramObject, DiagramProjection,
    FULLY_CONNECTED_MARK,
};
