// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Width in character cells. Every char counts as one cell.
pub(crate) fn text_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    match max_len {
        0 => String::new(),
        _ if text_len(text) <= max_len => text.to_owned(),
        1 => "…".to_owned(),
        _ => {
            let mut out = text.chars().take(max_len - 1).collect::<String>();
            out.push('…');
            out
        }
    }
}

/// Left offset that centers `len` cells inside `width` cells.
pub(crate) fn centered_offset(len: usize, width: usize) -> usize {
    width.saturating_sub(len) / 2
}
