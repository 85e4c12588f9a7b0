// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kanflow: terminal editor for workflow transition graphs.
//!
//! A workflow is a set of states and the allowed transitions between them. The session
//! controller keeps the graph model, the diagram and the transition panel consistent, and hands
//! every merged transition set to a [`session::WorkflowBackend`].

pub mod config;
pub mod diagram;
pub mod format;
pub mod layout;
pub mod model;
pub mod ops;
pub mod render;
pub mod session;
pub mod store;
pub mod tui;
