//! Role and permission endpoints.
//!
//! All handlers require an authenticated principal; the `AuthUser` extractor
//! rejects the request before handler logic otherwise. Role ids in responses
//! are URL-qualified through the identifier codec when a base URI is
//! configured.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::ident::RoleIdCodec;
use crate::jwt::AuthUser;
use crate::models::permission::Permission;
use crate::models::role::{PatchOperation, Role, RoleCreateRequest};
use crate::patch;

/// List the full permission catalog
#[utoipa::path(
    get,
    path = "/permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Permission catalog", body = Vec<Permission>),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_permissions(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Permission>>> {
    let permissions = state.store.list_permissions().await?;
    Ok(Json(permissions))
}

/// Get a single role
#[utoipa::path(
    get,
    path = "/roles/{id}",
    tag = "Roles",
    params(
        ("id" = String, Path, description = "Internal role id"),
    ),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 404, description = "Role not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Role>> {
    let codec = RoleIdCodec::new(&state.http);
    let mut role = state.store.get_role(&id).await?;
    role.id = codec.encode(&role.id);
    Ok(Json(role))
}

/// List all roles
#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    responses(
        (status = 200, description = "All stored roles", body = Vec<Role>),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Role>>> {
    let codec = RoleIdCodec::new(&state.http);
    let mut roles = state.store.get_roles().await?;
    for role in &mut roles {
        role.id = codec.encode(&role.id);
    }
    Ok(Json(roles))
}

/// Create a role
#[utoipa::path(
    post,
    path = "/roles",
    tag = "Roles",
    request_body = RoleCreateRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 409, description = "Duplicate role"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<RoleCreateRequest>,
) -> AppResult<(StatusCode, Json<Role>)> {
    payload.validate()?;

    let mut role = Role {
        id: Uuid::new_v4().to_string(),
        label: payload.label,
        comment: payload.comment,
        sys_permission: payload.sys_permission,
    };
    state.store.add_role(&role).await?;

    let codec = RoleIdCodec::new(&state.http);
    role.id = codec.encode(&role.id);
    Ok((StatusCode::CREATED, Json(role)))
}

/// Patch a role
///
/// The body is a patch envelope: an array of exactly one
/// `{op: "updateRole", changes}` object. Any other shape is rejected before
/// the store is touched.
#[utoipa::path(
    patch,
    path = "/roles/{id}",
    tag = "Roles",
    params(
        ("id" = String, Path, description = "Internal role id"),
    ),
    request_body = Vec<PatchOperation>,
    responses(
        (status = 200, description = "Updated role", body = Role),
        (status = 400, description = "Unsupported operations"),
        (status = 404, description = "Role not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn patch_role(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    Json(envelope): Json<Vec<PatchOperation>>,
) -> AppResult<Json<Role>> {
    let mut changes = patch::interpret(envelope)?;
    changes.validate()?;

    // A public-form id in the changes is canonicalized back to internal form
    // before it reaches the store.
    let codec = RoleIdCodec::new(&state.http);
    if let Some(public_id) = changes.id.take() {
        changes.id = Some(codec.decode(&public_id).to_string());
    }

    let mut role = state.store.update_role(&id, &changes).await?;
    role.id = codec.encode(&role.id);
    Ok(Json(role))
}

/// Delete a role
///
/// Deletion is idempotent: a missing role still yields 204. Store failures
/// other than "not found" propagate.
#[utoipa::path(
    delete,
    path = "/roles/{id}",
    tag = "Roles",
    params(
        ("id" = String, Path, description = "Internal role id"),
    ),
    responses(
        (status = 204, description = "Role deleted"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let existed = state.store.remove_role(&id).await?;
    if !existed {
        tracing::debug!(role_id = %id, "delete of absent role treated as success");
    }
    Ok(StatusCode::NO_CONTENT)
}
