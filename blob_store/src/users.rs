//! User repository. Structurally a smaller sibling of the blob store:
//! both fields are required on create and update.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::{Result, StoreError},
    models::User,
};

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email, created_at FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, name, email, created_at FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::UserNotFound(id))?;

        Ok(user)
    }

    pub async fn create(&self, name: &str, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateEmail(email.to_string())
            }
            _ => StoreError::Database(e),
        })?;

        tracing::debug!("created user: {}", user.id);
        Ok(user)
    }

    pub async fn update(&self, id: i64, name: &str, email: &str) -> Result<User> {
        let rows_affected = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail(email.to_string())
                }
                _ => StoreError::Database(e),
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::UserNotFound(id));
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::UserNotFound(id));
        }

        tracing::debug!("deleted user: {}", id);
        Ok(())
    }
}
