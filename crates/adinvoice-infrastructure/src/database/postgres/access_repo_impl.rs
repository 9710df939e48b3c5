//! PostgreSQL roles and permissions repository (control database)

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::error;

use adinvoice_core::domain::{Permission, PermissionInput, Role};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::AccessRepository;

use crate::database::{db_error, is_unique_violation};

pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Permission { id: row.id, code: row.code, description: row.description }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, FromRow)]
struct GrantRow {
    pub role_id: i64,
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
}

fn duplicate(e: sqlx::Error, message: &str) -> DomainError {
    error!("Database error saving access data: {}", e);
    if is_unique_violation(&e) {
        DomainError::AlreadyExists(message.to_string())
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

impl PgAccessRepository {
    /// Attach each role's permissions
    async fn with_permissions(&self, roles: Vec<RoleRow>) -> Result<Vec<Role>, DomainError> {
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let grants: Vec<GrantRow> = sqlx::query_as(
            r#"
            SELECT rp.role_id, p.id, p.code, p.description
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = ANY($1)
            ORDER BY p.code
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading role permissions"))?;

        let mut by_role: HashMap<i64, Vec<Permission>> = HashMap::new();
        for grant in grants {
            by_role.entry(grant.role_id).or_default().push(Permission {
                id: grant.id,
                code: grant.code,
                description: grant.description,
            });
        }

        Ok(roles
            .into_iter()
            .map(|r| Role {
                permissions: by_role.remove(&r.id).unwrap_or_default(),
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn find_role(&self, id: i64) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> = sqlx::query_as("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("finding role"))?;

        match row {
            Some(row) => Ok(self.with_permissions(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

async fn replace_grants(
    tx: &mut Transaction<'_, Postgres>,
    role_id: i64,
    permission_ids: &[i64],
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("clearing role permissions"))?;

    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, UNNEST($2::BIGINT[])
        "#,
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut **tx)
    .await
    .map_err(db_error("granting role permissions"))?;
    Ok(())
}

#[async_trait]
impl AccessRepository for PgAccessRepository {
    async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError> {
        let rows: Vec<PermissionRow> =
            sqlx::query_as("SELECT id, code, description FROM permissions ORDER BY code")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("listing permissions"))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_permission_by_code(&self, code: &str) -> Result<Option<Permission>, DomainError> {
        let row: Option<PermissionRow> =
            sqlx::query_as("SELECT id, code, description FROM permissions WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding permission"))?;
        Ok(row.map(Into::into))
    }

    async fn create_permission(&self, input: &PermissionInput) -> Result<Permission, DomainError> {
        let row: PermissionRow = sqlx::query_as(
            "INSERT INTO permissions (code, description) VALUES ($1, $2) RETURNING id, code, description",
        )
        .bind(&input.code)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate(e, "Permission with this code already exists"))?;
        Ok(row.into())
    }

    async fn update_permission(
        &self,
        id: i64,
        input: &PermissionInput,
    ) -> Result<Option<Permission>, DomainError> {
        let row: Option<PermissionRow> = sqlx::query_as(
            r#"
            UPDATE permissions SET code = $2, description = $3
            WHERE id = $1
            RETURNING id, code, description
            "#,
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate(e, "Permission with this code already exists"))?;
        Ok(row.map(Into::into))
    }

    async fn delete_permission(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting permission"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_permissions(&self, ids: Vec<i64>) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM permissions WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting permissions"))
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DomainError> {
        let rows: Vec<RoleRow> = sqlx::query_as("SELECT id, name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("listing roles"))?;
        self.with_permissions(rows).await
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, DomainError> {
        let row: Option<RoleRow> =
            sqlx::query_as("SELECT id, name FROM roles WHERE LOWER(name) = LOWER($1)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding role by name"))?;

        match row {
            Some(row) => Ok(self.with_permissions(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_role(&self, name: &str, permission_ids: Vec<i64>) -> Result<Role, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let role_id: i64 = sqlx::query_scalar("INSERT INTO roles (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| duplicate(e, "Role with this name already exists"))?;
        replace_grants(&mut tx, role_id, &permission_ids).await?;

        tx.commit().await.map_err(db_error("committing role"))?;
        self.find_role(role_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Role", role_id))
    }

    async fn update_role(
        &self,
        id: i64,
        name: &str,
        permission_ids: Option<Vec<i64>>,
    ) -> Result<Option<Role>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let updated = sqlx::query("UPDATE roles SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| duplicate(e, "Role with this name already exists"))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(ids) = permission_ids {
            replace_grants(&mut tx, id, &ids).await?;
        }

        tx.commit().await.map_err(db_error("committing role"))?;
        self.find_role(id).await
    }

    async fn delete_role(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting role"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_roles(&self, ids: Vec<i64>) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting roles"))
    }

    async fn set_user_roles(&self, user_id: i64, role_ids: Vec<i64>) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("clearing user roles"))?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) SELECT $1, UNNEST($2::BIGINT[])")
            .bind(user_id)
            .bind(&role_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("assigning user roles"))?;

        tx.commit().await.map_err(db_error("committing user roles"))?;
        Ok(())
    }

    async fn count_user_roles(&self, user_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting user roles"))
    }

    async fn user_has_permission(&self, user_id: i64, code: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN role_permissions rp ON rp.role_id = ur.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE ur.user_id = $1 AND p.code = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("checking user permission"))
    }
}
