use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

// =============================================================================
// ROLE
// =============================================================================

/// A named bundle of permission identifiers.
///
/// `sys_permission` is a set: unique, never empty, order-irrelevant. The store
/// enforces uniqueness; handlers reject empty sets before the store is hit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "sysPermission")]
    #[schema(example = json!(["ROLE_CREATE", "ROLE_EDIT"]))]
    pub sys_permission: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RoleCreateRequest {
    #[schema(example = "editor")]
    pub label: Option<String>,
    #[schema(example = "Can edit documents")]
    pub comment: Option<String>,
    #[serde(rename = "sysPermission")]
    #[schema(example = json!(["EDIT_DOC", "VIEW_DOC"]))]
    pub sys_permission: Vec<String>,
}

impl RoleCreateRequest {
    /// Semantic checks the wire schema cannot express: the permission list
    /// must be non-empty and duplicate-free.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_permission_set(&self.sys_permission)
    }
}

// =============================================================================
// PATCH ENVELOPE
// =============================================================================

/// One element of the patch envelope: `{op, changes}`. The envelope is an
/// ordered sequence of these; only `op == "updateRole"` is recognized.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatchOperation {
    #[schema(example = "updateRole")]
    pub op: String,
    pub changes: RoleChanges,
}

/// Partial role carried by an `updateRole` operation. Omitted fields are left
/// unchanged; a present `id` renames the role and may arrive in public URL
/// form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RoleChanges {
    pub id: Option<String>,
    pub label: Option<String>,
    pub comment: Option<String>,
    #[serde(rename = "sysPermission")]
    pub sys_permission: Option<Vec<String>>,
}

impl RoleChanges {
    pub fn validate(&self) -> Result<(), AppError> {
        match &self.sys_permission {
            Some(permissions) => validate_permission_set(permissions),
            None => Ok(()),
        }
    }
}

fn validate_permission_set(permissions: &[String]) -> Result<(), AppError> {
    if permissions.is_empty() {
        return Err(AppError::bad_request("sysPermission must not be empty"));
    }
    let unique: std::collections::HashSet<&str> =
        permissions.iter().map(String::as_str).collect();
    if unique.len() != permissions.len() {
        return Err(AppError::bad_request("sysPermission must not contain duplicates"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(permissions: &[&str]) -> RoleCreateRequest {
        RoleCreateRequest {
            label: Some("editor".to_string()),
            comment: None,
            sys_permission: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn create_request_accepts_unique_non_empty_permissions() {
        assert!(create_request(&["EDIT_DOC", "VIEW_DOC"]).validate().is_ok());
    }

    #[test]
    fn create_request_rejects_empty_permissions() {
        assert!(matches!(
            create_request(&[]).validate(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn create_request_rejects_duplicate_permissions() {
        assert!(matches!(
            create_request(&["VIEW_DOC", "VIEW_DOC"]).validate(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn changes_without_permissions_validate() {
        let changes = RoleChanges {
            label: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn changes_reject_empty_permission_set() {
        let changes = RoleChanges {
            sys_permission: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(changes.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn patch_operation_rejects_unknown_fields() {
        let raw = serde_json::json!({
            "op": "updateRole",
            "changes": {"label": "x"},
            "extra": true
        });
        assert!(serde_json::from_value::<PatchOperation>(raw).is_err());
    }
}
