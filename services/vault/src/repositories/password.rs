//! Password record repository for database operations

use async_trait::async_trait;
use common::{DatabaseError, DatabaseResult};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::PasswordStore;
use crate::models::{NewPasswordRecord, PasswordRecord};

/// PostgreSQL-backed password record repository
#[derive(Clone)]
pub struct PasswordRepository {
    pool: PgPool,
}

impl PasswordRepository {
    /// Create a new password record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: PgRow) -> PasswordRecord {
    let extra: Json<Map<String, Value>> = row.get("extra");
    PasswordRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        site: row.get("site"),
        username: row.get("username"),
        password: row.get("password"),
        created_at: row.get("created_at"),
        extra: extra.0,
    }
}

#[async_trait]
impl PasswordStore for PasswordRepository {
    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<PasswordRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, site, username, password, extra, created_at
            FROM passwords
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.into_iter().map(record_from_row).collect())
    }

    // TODO: encrypt `password` at rest with a server-held key; it is stored as submitted.
    async fn create(
        &self,
        user_id: Uuid,
        record: &NewPasswordRecord,
    ) -> DatabaseResult<PasswordRecord> {
        info!("Storing password record for user: {}", user_id);

        let row = sqlx::query(
            r#"
            INSERT INTO passwords (user_id, site, username, password, extra)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, site, username, password, extra, created_at
            "#,
        )
        .bind(user_id)
        .bind(&record.site)
        .bind(&record.username)
        .bind(&record.password)
        .bind(Json(&record.extra))
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(record_from_row(row))
    }

    async fn delete_for_user(&self, user_id: Uuid, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM passwords
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
