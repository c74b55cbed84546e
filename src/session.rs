//! Session materialization.
//!
//! Session state is assembled per request and owns the derived permission
//! table for the request's lifetime; nothing here is persisted.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{build_permission_table, PermissionTable};
use crate::errors::AppError;
use crate::jwt::AuthUser;
use crate::store::RoleStore;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<SessionIdentity>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionIdentity {
    pub id: Uuid,
    #[serde(rename = "sysResourceRole", skip_serializing_if = "Option::is_none")]
    pub sys_resource_role: Option<Vec<String>>,
    #[serde(rename = "sysPermissionTable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub sys_permission_table: Option<PermissionTable>,
}

impl SessionIdentity {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            sys_resource_role: None,
            sys_permission_table: None,
        }
    }
}

/// Attaches the principal's role set and derived permission table to session
/// state. Anonymous and roleless principals leave the state untouched; a
/// table-build failure aborts materialization so downstream authorization
/// never runs on a partial table.
pub async fn augment_session(
    store: &dyn RoleStore,
    principal: Option<&AuthUser>,
    state: &mut SessionState,
) -> Result<(), AppError> {
    let Some(principal) = principal else {
        return Ok(());
    };
    if principal.roles.is_empty() {
        return Ok(());
    }

    let table = build_permission_table(store, &principal.roles).await?;

    let identity = state
        .identity
        .get_or_insert_with(|| SessionIdentity::new(principal.user_id));
    identity.sys_resource_role = Some(principal.roles.clone());
    identity.sys_permission_table = Some(table);

    Ok(())
}
