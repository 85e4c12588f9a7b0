// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::StateKey;

pub const DEFAULT_STATE_CATEGORY: &str = "status";
pub const DEFAULT_STATE_COLOR: &str = "#94a3b8";

/// A node in the workflow graph.
///
/// `key` is fixed at construction. `order` ranks states and is denormalized onto transitions;
/// change it through [`crate::model::Workflow::set_state_order`] so the copies stay in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    key: StateKey,
    name: String,
    category: String,
    color: String,
    order: i64,
}

impl State {
    pub fn new(key: StateKey, name: impl Into<String>, order: i64) -> Self {
        Self {
            key,
            name: name.into(),
            category: DEFAULT_STATE_CATEGORY.to_owned(),
            color: DEFAULT_STATE_COLOR.to_owned(),
            order,
        }
    }

    pub fn new_with(
        key: StateKey,
        name: impl Into<String>,
        category: impl Into<String>,
        color: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            category: category.into(),
            color: color.into(),
            order,
        }
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub(crate) fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}
