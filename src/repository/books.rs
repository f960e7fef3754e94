//! Books repository for database operations.
//!
//! Every query filters `is_deleted = FALSE` explicitly; soft-deleted rows
//! exist only for the ledger's history.

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{CreateBookRequest, UpdateBookRequest},
        Book,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a non-deleted book by ID, if present
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book =
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(book)
    }

    /// Paged catalog query with title substring and publish-date range filters
    pub async fn get_page(
        &self,
        page: i64,
        page_size: i64,
        name: Option<&str>,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<(Vec<Book>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE is_deleted = FALSE
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::date IS NULL OR publish_date >= $2)
              AND ($3::date IS NULL OR publish_date <= $3)
            "#,
        )
        .bind(name)
        .bind(begin)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE is_deleted = FALSE
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::date IS NULL OR publish_date >= $2)
              AND ($3::date IS NULL OR publish_date <= $3)
            ORDER BY id
            LIMIT $5 OFFSET ($4 - 1) * $5
            "#,
        )
        .bind(name)
        .bind(begin)
        .bind(end)
        .bind(page)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Borrowable titles: active, not deleted, with a free copy
    pub async fn get_available(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> AppResult<(Vec<Book>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE is_deleted = FALSE AND status = 1 AND borrowed_copies < total_copies
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR author ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(keyword)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE is_deleted = FALSE AND status = 1 AND borrowed_copies < total_copies
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR author ILIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $3 OFFSET ($2 - 1) * $3
            "#,
        )
        .bind(keyword)
        .bind(page)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Keyword search used by the chat assistant's catalog grounding
    pub async fn search_by_keyword(&self, keyword: &str, limit: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE is_deleted = FALSE
              AND (name ILIKE '%' || $1 || '%' OR author ILIKE '%' || $1 || '%')
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(keyword)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a new book
    pub async fn create(&self, req: &CreateBookRequest) -> AppResult<Book> {
        let now = Utc::now();
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books
                (name, author, publish_date, price, category_id, publisher_id,
                 total_copies, borrowed_copies, status, is_deleted, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 1, FALSE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.author)
        .bind(req.publish_date)
        .bind(req.price)
        .bind(req.category_id)
        .bind(req.publisher_id)
        .bind(req.total_copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Update scalar fields of a book. `borrowed_copies` is deliberately not
    /// touched here; only the borrowing engine writes it.
    pub async fn update(&self, req: &UpdateBookRequest) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET name = $2, author = $3, publish_date = $4, price = $5,
                category_id = $6, publisher_id = $7, total_copies = $8, update_time = $9
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(req.id)
        .bind(&req.name)
        .bind(&req.author)
        .bind(req.publish_date)
        .bind(req.price)
        .bind(req.category_id)
        .bind(req.publisher_id)
        .bind(req.total_copies)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book with id {} not found", req.id)))?;
        Ok(book)
    }

    /// Change the catalog status (1 = active, 2 = withdrawn)
    pub async fn change_status(&self, id: i32, status: i16) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE books SET status = $2, update_time = $3 WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .bind(status)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("book with id {} not found", id)));
        }
        Ok(())
    }

    /// Soft delete: the row stays for ledger history, queries stop seeing it
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE books SET is_deleted = TRUE, update_time = $2 WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("book with id {} not found", id)));
        }
        Ok(())
    }

    /// Sum of owned copies across the catalog
    pub async fn total_copies(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_copies), 0) FROM books WHERE is_deleted = FALSE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Sum of copies currently lent out
    pub async fn borrowed_copies(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(borrowed_copies), 0) FROM books WHERE is_deleted = FALSE",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Copies per category, for the reporting projector
    pub async fn copies_by_category(&self) -> AppResult<Vec<(i32, i64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT category_id, COALESCE(SUM(total_copies), 0)
            FROM books WHERE is_deleted = FALSE
            GROUP BY category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Copies per catalog status, for the reporting projector
    pub async fn copies_by_status(&self) -> AppResult<Vec<(i16, i64)>> {
        let rows: Vec<(i16, i64)> = sqlx::query_as(
            r#"
            SELECT status, COALESCE(SUM(total_copies), 0)
            FROM books WHERE is_deleted = FALSE
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Copies per publication year, optionally bounded, for the reporting projector
    pub async fn copies_by_year(
        &self,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> AppResult<Vec<(i32, i64)>> {
        let rows: Vec<(i32, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(EXTRACT(YEAR FROM publish_date) AS INT) AS year,
                   COALESCE(SUM(total_copies), 0)
            FROM books
            WHERE is_deleted = FALSE
              AND ($1::int IS NULL OR EXTRACT(YEAR FROM publish_date) >= $1)
              AND ($2::int IS NULL OR EXTRACT(YEAR FROM publish_date) <= $2)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(start_year)
        .bind(end_year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Number of non-deleted books referencing a category
    pub async fn count_by_category(&self, category_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE category_id = $1 AND is_deleted = FALSE",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Number of non-deleted books referencing a publisher
    pub async fn count_by_publisher(&self, publisher_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE publisher_id = $1 AND is_deleted = FALSE",
        )
        .bind(publisher_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
