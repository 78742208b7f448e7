//! Auth-related database queries (Postgres).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::AuthError;
use super::store::CredentialStore;
use crate::models::auth::{CredentialRecord, NewCredential, PermissionKind, ResetCode, Role};

const USER_COLUMNS: &str = "id, email, name, password_hash, role, reset_code, \
                            reset_code_expires_at, created_at";

/// Row shape of the `users` table.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    reset_code: Option<String>,
    reset_code_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for CredentialRecord {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let reset = match (row.reset_code, row.reset_code_expires_at) {
            (Some(code), Some(expires_at)) => Some(ResetCode { code, expires_at }),
            _ => None,
        };
        Ok(CredentialRecord {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| AuthError::Internal(format!("users.role: {e}")))?,
            reset,
            created_at: row.created_at,
        })
    }
}

/// [`CredentialStore`] backed by the `users` and `therapist_permissions`
/// tables.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, new: NewCredential) -> Result<CredentialRecord, AuthError> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(new.id)
            .bind(&new.email)
            .bind(&new.name)
            .bind(&new.password_hash)
            .bind(new.role.as_str())
            .bind(new.created_at)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CredentialRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CredentialRecord>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CredentialRecord::try_from).transpose()
    }

    async fn set_reset_code(&self, email: &str, reset: &ResetCode) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users SET reset_code = $2, reset_code_expires_at = $3 \
             WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .bind(&reset.code)
        .bind(reset.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete_password_reset(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        new_password_hash: &str,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $4, reset_code = NULL, reset_code_expires_at = NULL \
             WHERE lower(email) = lower($1) \
               AND reset_code = $2 \
               AND reset_code_expires_at > $3",
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .bind(new_password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn permissions_for(
        &self,
        user_id: Uuid,
    ) -> Result<HashMap<PermissionKind, bool>, AuthError> {
        let rows = sqlx::query_as::<_, (String, bool)>(
            "SELECT permission, granted FROM therapist_permissions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut grants = HashMap::with_capacity(rows.len());
        for (permission, granted) in rows {
            match permission.parse::<PermissionKind>() {
                Ok(kind) => {
                    grants.insert(kind, granted);
                }
                Err(_) => warn!(%user_id, %permission, "ignoring unknown permission row"),
            }
        }
        Ok(grants)
    }

    async fn set_permission(
        &self,
        user_id: Uuid,
        kind: PermissionKind,
        granted: bool,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO therapist_permissions (user_id, permission, granted) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, permission) \
             DO UPDATE SET granted = EXCLUDED.granted, updated_at = now()",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(granted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
