//! Publishers repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{publisher::PublisherRequest, Publisher},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Publisher>> {
        let rows = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("publisher with id {} not found", id)))
    }

    pub async fn get_page(
        &self,
        page: i64,
        page_size: i64,
        name: Option<&str>,
    ) -> AppResult<(Vec<Publisher>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM publishers WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Publisher>(
            r#"
            SELECT * FROM publishers
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

    pub async fn create(&self, req: &PublisherRequest) -> AppResult<Publisher> {
        let publisher = sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers (name, contact, phone, address, create_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.contact)
        .bind(&req.phone)
        .bind(&req.address)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(publisher)
    }

    pub async fn update(&self, id: i32, req: &PublisherRequest) -> AppResult<Publisher> {
        let publisher = sqlx::query_as::<_, Publisher>(
            r#"
            UPDATE publishers
            SET name = $2, contact = $3, phone = $4, address = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.contact)
        .bind(&req.phone)
        .bind(&req.address)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("publisher with id {} not found", id)))?;
        Ok(publisher)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("publisher with id {} not found", id)));
        }
        Ok(())
    }
}
