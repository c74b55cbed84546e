use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::permission::Permission;
use crate::models::role::{Role, RoleChanges};
use crate::store::RoleStore;

/// sqlx-backed role store. Roles live in `roles`; their permission sets in
/// `role_permissions` with a `(role_id, permission)` primary key, which gives
/// set semantics at the storage level.
#[derive(Clone)]
pub struct SqliteRoleStore {
    pool: SqlitePool,
}

impl SqliteRoleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for SqliteRoleStore {
    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let rows = sqlx::query("SELECT id, label, comment FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Permission {
                id: row.get("id"),
                label: row.get("label"),
                comment: row.get("comment"),
            })
            .collect())
    }

    async fn get_role(&self, id: &str) -> Result<Role, AppError> {
        let row = sqlx::query("SELECT id, label, comment FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("role not found"))?;

        let permissions: Vec<String> = sqlx::query_scalar(
            "SELECT permission FROM role_permissions WHERE role_id = ? ORDER BY permission",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Role {
            id: row.get("id"),
            label: row.get("label"),
            comment: row.get("comment"),
            sys_permission: permissions,
        })
    }

    async fn get_roles(&self) -> Result<Vec<Role>, AppError> {
        let role_rows = sqlx::query("SELECT id, label, comment FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let permission_rows = sqlx::query(
            "SELECT role_id, permission FROM role_permissions ORDER BY role_id, permission",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut permissions_by_role: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in &permission_rows {
            permissions_by_role
                .entry(row.get("role_id"))
                .or_default()
                .push(row.get("permission"));
        }

        Ok(role_rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let sys_permission = permissions_by_role.remove(&id).unwrap_or_default();
                Role {
                    id,
                    label: row.get("label"),
                    comment: row.get("comment"),
                    sys_permission,
                }
            })
            .collect())
    }

    async fn add_role(&self, role: &Role) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO roles (id, label, comment, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&role.id)
        .bind(&role.label)
        .bind(&role.comment)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        for permission in &role.sys_permission {
            sqlx::query("INSERT INTO role_permissions (role_id, permission) VALUES (?, ?)")
                .bind(&role.id)
                .bind(permission)
                .execute(&mut *tx)
                .await
                .map_err(map_unique_violation)?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_role(&self, id: &str, changes: &RoleChanges) -> Result<Role, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id, label, comment FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("role not found"))?;

        let new_id = changes.id.clone().unwrap_or_else(|| id.to_string());
        let label = changes.label.clone().or_else(|| existing.get("label"));
        let comment = changes.comment.clone().or_else(|| existing.get("comment"));

        sqlx::query("UPDATE roles SET id = ?, label = ?, comment = ?, updated_at = ? WHERE id = ?")
            .bind(&new_id)
            .bind(&label)
            .bind(&comment)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        if new_id != id {
            sqlx::query("UPDATE role_permissions SET role_id = ? WHERE role_id = ?")
                .bind(&new_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(permissions) = &changes.sys_permission {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
                .bind(&new_id)
                .execute(&mut *tx)
                .await?;
            for permission in permissions {
                sqlx::query("INSERT INTO role_permissions (role_id, permission) VALUES (?, ?)")
                    .bind(&new_id)
                    .bind(permission)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_unique_violation)?;
            }
        }

        let sys_permission: Vec<String> = sqlx::query_scalar(
            "SELECT permission FROM role_permissions WHERE role_id = ? ORDER BY permission",
        )
        .bind(&new_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Role {
            id: new_id,
            label,
            comment,
            sys_permission,
        })
    }

    async fn remove_role(&self, id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The database reports uniqueness conflicts; this module surfaces them as
/// `DuplicateRole` and does not resolve them.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateRole,
        _ => AppError::Database(err),
    }
}
