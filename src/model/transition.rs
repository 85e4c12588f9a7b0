// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::StateKey;
use super::state::State;

/// A directed edge between two states.
///
/// Identity is the `(from_key, to_key)` pair. The orders are copies of the endpoint states'
/// `order` and are only ever written by order re-application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    from_key: StateKey,
    to_key: StateKey,
    from_order: i64,
    to_order: i64,
}

impl Transition {
    /// Creates a transition with zeroed orders; callers re-apply orders before it is stored.
    pub fn new(from_key: StateKey, to_key: StateKey) -> Self {
        Self { from_key, to_key, from_order: 0, to_order: 0 }
    }

    /// Creates a transition carrying orders from elsewhere, e.g. the last values a backend sent.
    pub fn with_orders(
        from_key: StateKey,
        to_key: StateKey,
        from_order: i64,
        to_order: i64,
    ) -> Self {
        Self { from_key, to_key, from_order, to_order }
    }

    /// Creates a transition whose orders are taken from the two endpoint states.
    pub fn between(from: &State, to: &State) -> Self {
        Self {
            from_key: from.key().clone(),
            to_key: to.key().clone(),
            from_order: from.order(),
            to_order: to.order(),
        }
    }

    pub fn from_key(&self) -> &StateKey {
        &self.from_key
    }

    pub fn to_key(&self) -> &StateKey {
        &self.to_key
    }

    pub fn from_order(&self) -> i64 {
        self.from_order
    }

    pub fn to_order(&self) -> i64 {
        self.to_order
    }

    pub fn pair(&self) -> (&StateKey, &StateKey) {
        (&self.from_key, &self.to_key)
    }

    pub fn connects(&self, from_key: &StateKey, to_key: &StateKey) -> bool {
        &self.from_key == from_key && &self.to_key == to_key
    }

    pub fn is_self_loop(&self) -> bool {
        self.from_key == self.to_key
    }

    pub(crate) fn set_orders(&mut self, from_order: i64, to_order: i64) {
        self.from_order = from_order;
        self.to_order = to_order;
    }
}
