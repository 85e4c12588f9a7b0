// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire records for the fetch and persist contracts.
//!
//! Records are the loose JSON shape a backend speaks. [`decode_workflow`] turns them into the
//! model and reports whatever it had to coerce along the way.

mod decode;
mod record;

pub use decode::{decode_workflow, DecodeError, DecodeWarning, DecodedWorkflow};
pub use record::{
    PersistPayload, StateRecord, TransitionRecord, WorkflowRecord, PERSIST_UPDATE_NAME,
};
