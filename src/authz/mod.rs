//! Permission table derivation.
//!
//! A principal's assigned roles are compacted into a lookup table mapping
//! each granted permission id to `true`. The table is attached to session
//! state and is never persisted.

use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::store::RoleStore;

/// Fast permission lookup derived from a role set. `BTreeMap` keeps the
/// serialized form deterministic.
pub type PermissionTable = BTreeMap<String, bool>;

/// Flattens the permission sets of `role_ids` into a deduplicated table.
///
/// Fails closed: if any assigned role cannot be resolved the whole build
/// fails, rather than silently understating the principal's grants. Callers
/// that swallow this error must treat the missing table as "no permissions".
pub async fn build_permission_table(
    store: &dyn RoleStore,
    role_ids: &[String],
) -> Result<PermissionTable, AppError> {
    let mut table = PermissionTable::new();
    for role_id in role_ids {
        let role = store.get_role(role_id).await?;
        for permission in role.sys_permission {
            table.insert(permission, true);
        }
    }
    Ok(table)
}
