//! Role/permission persistence contract.
//!
//! Handlers and the session hook talk to the store through this trait only.
//! The store owns duplicate-key detection (surfaced as `DuplicateRole`) and
//! distinguishes "not found" from other failures; it provides its own
//! concurrency control and the callers never retry or lock.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::permission::Permission;
use crate::models::role::{Role, RoleChanges};

mod sqlite;

pub use sqlite::SqliteRoleStore;

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Full permission catalog.
    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError>;

    /// Single role by internal id. `NotFound` when absent.
    async fn get_role(&self, id: &str) -> Result<Role, AppError>;

    /// All stored roles.
    async fn get_roles(&self) -> Result<Vec<Role>, AppError>;

    /// Inserts a role. `DuplicateRole` when the id or label collides.
    async fn add_role(&self, role: &Role) -> Result<(), AppError>;

    /// Applies a partial update to the role with internal id `id` and returns
    /// the updated role. A present `changes.id` renames the role.
    async fn update_role(&self, id: &str, changes: &RoleChanges) -> Result<Role, AppError>;

    /// Deletes a role. Returns whether a row existed, so callers can treat
    /// "already absent" as idempotent success while real failures propagate.
    async fn remove_role(&self, id: &str) -> Result<bool, AppError>;
}
