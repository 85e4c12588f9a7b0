// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::LineSpan;

/// The text under each span, one line per span.
pub(crate) fn collect_spanned_text(text: &str, spans: &[LineSpan]) -> String {
    let lines = text.lines().collect::<Vec<_>>();
    spans
        .iter()
        .map(|&(y, x0, x1)| {
            let line = lines.get(y).expect("span row in bounds");
            let mut slice = line.chars().skip(x0).take(x1 - x0 + 1).collect::<String>();
            slice.push('\n');
            slice
        })
        .collect()
}
