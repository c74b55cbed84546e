//! Role patch interpreter.
//!
//! The patch envelope is an ordered sequence of tagged operations. Only
//! `updateRole` is recognized today; anything else is rejected outright
//! rather than ignored, so a partially-understood envelope can never be
//! applied.

use crate::errors::AppError;
use crate::models::role::{PatchOperation, RoleChanges};

pub const UPDATE_ROLE_OP: &str = "updateRole";

/// Extracts the single `updateRole` payload from a patch envelope.
///
/// Fails with `NotImplemented` when the envelope is empty, contains more than
/// one operation, or contains any operation whose `op` is not `updateRole`.
pub fn interpret(envelope: Vec<PatchOperation>) -> Result<RoleChanges, AppError> {
    let total = envelope.len();
    let mut updates: Vec<RoleChanges> = envelope
        .into_iter()
        .filter(|operation| operation.op == UPDATE_ROLE_OP)
        .map(|operation| operation.changes)
        .collect();

    if updates.len() != total || updates.len() != 1 {
        return Err(AppError::NotImplemented);
    }

    Ok(updates.remove(0))
}
