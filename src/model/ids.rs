// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Identifier newtypes.
//!
//! Each kind carries its own rule. State keys and scope ids come straight off the wire or the
//! command line and only need to be non-empty without surrounding whitespace. Workflow ids also
//! name files in the folder store, so they are additionally a single path segment.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    Empty { kind: &'static str },
    /// Leading or trailing whitespace; keys are compared byte for byte.
    Padded { kind: &'static str },
    ContainsSlash { kind: &'static str },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
            Self::Padded { kind } => write!(f, "{kind} must not start or end with whitespace"),
            Self::ContainsSlash { kind } => write!(f, "{kind} must not contain '/'"),
        }
    }
}

impl std::error::Error for IdError {}

fn trimmed(kind: &'static str, value: &str) -> Result<(), IdError> {
    if value.trim().is_empty() {
        return Err(IdError::Empty { kind });
    }
    if value.trim() != value {
        return Err(IdError::Padded { kind });
    }
    Ok(())
}

fn file_segment(kind: &'static str, value: &str) -> Result<(), IdError> {
    trimmed(kind, value)?;
    if value.contains('/') {
        return Err(IdError::ContainsSlash { kind });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $rule:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                $rule($kind, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Stable key of a workflow state (e.g. `todo`, `in_progress`).
    StateKey,
    "state key",
    trimmed
);
string_id!(WorkflowId, "workflow id", file_segment);
string_id!(BoardId, "board id", trimmed);
string_id!(TeamId, "team id", trimmed);
