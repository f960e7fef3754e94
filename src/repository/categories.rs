//! Categories repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{category::CategoryRequest, Category},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All categories, for dropdowns and report lookups
    pub async fn get_all(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category with id {} not found", id)))
    }

    pub async fn get_page(
        &self,
        page: i64,
        page_size: i64,
        name: Option<&str>,
    ) -> AppResult<(Vec<Category>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $3 OFFSET ($2 - 1) * $3
            "#,
        )
        .bind(name)
        .bind(page)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn create(&self, req: &CategoryRequest) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, status, create_time)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.status.unwrap_or(1))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn update(&self, id: i32, req: &CategoryRequest) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, description = $3, status = COALESCE($4, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category with id {} not found", id)))?;
        Ok(category)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("category with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
