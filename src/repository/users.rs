//! Users (patrons) repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{CreateUserRequest, UpdateUserRequest},
        User,
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a patron by ID, if present
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a patron by ID, erroring when absent
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", id)))
    }

    /// Resolve a patron by card number, falling back to exact name. Used by
    /// the borrow flow when the console sends a non-numeric identifier.
    pub async fn find_by_card_or_name(&self, input: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE card_number = $1 OR name = $1
            ORDER BY (card_number = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(input)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Paged patron query with optional name/phone/card filters
    pub async fn get_page(
        &self,
        page: i64,
        page_size: i64,
        name: Option<&str>,
        phone: Option<&str>,
        card_number: Option<&str>,
    ) -> AppResult<(Vec<User>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR phone ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR card_number ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(card_number)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR phone ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR card_number ILIKE '%' || $3 || '%')
            ORDER BY id
            LIMIT $5 OFFSET ($4 - 1) * $5
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(card_number)
        .bind(page)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// True iff another patron already holds this card number
    pub async fn card_number_exists(&self, card_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE card_number = $1 AND ($2::int IS NULL OR id != $2)
            )
            "#,
        )
        .bind(card_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new patron, active by default
    pub async fn create(&self, req: &CreateUserRequest) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, phone, email, card_number, status, create_time)
            VALUES ($1, $2, $3, $4, 1, $5)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.card_number)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Update patron contact details and card number
    pub async fn update(&self, id: i32, req: &UpdateUserRequest) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, phone = $3, email = $4, card_number = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.card_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", id)))?;
        Ok(user)
    }

    /// Change patron status (1 = active, 0 = disabled)
    pub async fn change_status(&self, id: i32, status: i16) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a patron. The guard against open borrows lives in the service;
    /// a patron with returned history still trips the ledger's foreign key,
    /// which surfaces as a Conflict rather than a storage error.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db)
                    if db.kind() == sqlx::error::ErrorKind::ForeignKeyViolation =>
                {
                    AppError::Conflict(
                        "the patron has borrow history and cannot be deleted".to_string(),
                    )
                }
                other => AppError::Database(other),
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user with id {} not found", id)));
        }
        Ok(())
    }
}
