//! Borrow ledger repository.
//!
//! The ledger is append-mostly: rows are inserted on borrow, updated on
//! return/renew, and never deleted. Every mutation here runs inside a single
//! database transaction that also covers the paired `borrowed_copies` change
//! on the book row, so no partial effect is ever observable. Dropping the
//! transaction on any error path rolls it back.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{close_status, BorrowRecordDto, LOAN_DAYS, MAX_ACTIVE_BORROWS},
        BorrowRecord, BorrowStatus,
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a ledger row by ID, if present
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<BorrowRecord>> {
        let record =
            sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record)
    }

    /// Paged projection for the admin console, newest borrow first.
    ///
    /// `status` filters on the console's view of the lifecycle: 1 = open and
    /// not yet due, 2 = returned, 3 = open and past due.
    pub async fn get_page(
        &self,
        page: i64,
        page_size: i64,
        user_name: Option<&str>,
        status: Option<i16>,
    ) -> AppResult<(Vec<BorrowRecordDto>, i64)> {
        let status_filter = match status {
            Some(1) => " AND r.actual_return_date IS NULL AND r.due_date >= NOW()",
            Some(2) => " AND r.actual_return_date IS NOT NULL",
            Some(3) => " AND r.actual_return_date IS NULL AND r.due_date < NOW()",
            _ => "",
        };
        // The patron-name bind is positional, so each statement names its own
        // placeholder for it.
        let name_filter = |n: &str| {
            if user_name.is_some() {
                format!(" AND u.name ILIKE '%' || {n} || '%'")
            } else {
                String::new()
            }
        };

        let count_sql = format!(
            r#"
            SELECT COUNT(*)
            FROM borrow_records r
            JOIN users u ON r.user_id = u.id
            WHERE TRUE{status_filter}{}
            "#,
            name_filter("$1")
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(name) = user_name {
            count_query = count_query.bind(name);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let rows_sql = format!(
            r#"
            SELECT r.id, r.book_id, COALESCE(b.name, 'unknown title') AS book_name,
                   r.user_id, u.name AS user_name,
                   r.borrow_date, r.due_date, r.actual_return_date,
                   r.status, r.renew_count,
                   (r.actual_return_date IS NULL AND r.due_date < NOW()) AS is_overdue
            FROM borrow_records r
            JOIN users u ON r.user_id = u.id
            LEFT JOIN books b ON r.book_id = b.id
            WHERE TRUE{status_filter}{}
            ORDER BY r.borrow_date DESC
            LIMIT $2 OFFSET ($1 - 1) * $2
            "#,
            name_filter("$3")
        );
        let mut rows_query = sqlx::query_as::<_, BorrowRecordDto>(&rows_sql)
            .bind(page)
            .bind(page_size);
        if let Some(name) = user_name {
            rows_query = rows_query.bind(name);
        }
        let rows = rows_query.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// The patron's open record for this exact title, if any
    pub async fn find_open_by_user_and_book(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> AppResult<Option<BorrowRecord>> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrow_records
            WHERE user_id = $1 AND book_id = $2 AND actual_return_date IS NULL
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Count of the patron's currently-unreturned records
    pub async fn active_borrow_count(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE user_id = $1 AND actual_return_date IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// True iff the patron has any unreturned record; consumed by the patron
    /// disable/delete guards
    pub async fn has_active_borrow(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_records WHERE user_id = $1 AND actual_return_date IS NULL)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// True iff an unreturned Borrowing record exists for the book; consumed
    /// by the catalog withdraw/delete guards
    pub async fn has_unreturned_record(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_records WHERE book_id = $1 AND status = $2)",
        )
        .bind(book_id)
        .bind(i16::from(BorrowStatus::Borrowing))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a ledger row and increment the book's `borrowed_copies` in one
    /// transaction.
    ///
    /// The service layer has already validated the full precondition chain;
    /// the checks that must still hold at commit time are re-run under locks
    /// here. The book row is locked with `FOR UPDATE` and the stock re-checked,
    /// so concurrent borrows against the last copy serialize and exactly one
    /// succeeds. The patron row is then locked and the open-record count
    /// re-taken, so concurrent borrows cannot push a patron past the ceiling.
    /// The one-open-record-per-(patron, book) rule is backed by a partial
    /// unique index; its violation surfaces as a Conflict.
    pub async fn create_borrow(&self, book_id: i32, user_id: i32) -> AppResult<BorrowRecord> {
        let now = Utc::now();
        let due_date = now + Duration::days(LOAN_DAYS);

        let mut tx = self.pool.begin().await?;

        let book_row = sqlx::query(
            r#"
            SELECT status, total_copies, borrowed_copies FROM books
            WHERE id = $1 AND is_deleted = FALSE
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;

        let status: i16 = book_row.get("status");
        let total: i32 = book_row.get("total_copies");
        let borrowed: i32 = book_row.get("borrowed_copies");

        if status != 1 {
            return Err(AppError::Conflict(
                "the book has been withdrawn and cannot be borrowed".to_string(),
            ));
        }
        if borrowed >= total {
            return Err(AppError::Conflict("no copies available".to_string()));
        }

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("patron not found".to_string()))?;

        let open_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE user_id = $1 AND actual_return_date IS NULL",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if open_count >= MAX_ACTIVE_BORROWS {
            return Err(AppError::Conflict(format!(
                "borrow limit reached: at most {} books may be out at once",
                MAX_ACTIVE_BORROWS
            )));
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records
                (book_id, user_id, borrow_date, due_date, status, renew_count, create_time, update_time)
            VALUES ($1, $2, $3, $4, $5, 0, $3, $3)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(due_date)
        .bind(i16::from(BorrowStatus::Borrowing))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db)
                if db.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                AppError::Conflict("this patron is already borrowing this book".to_string())
            }
            other => AppError::Database(other),
        })?;

        sqlx::query(
            "UPDATE books SET borrowed_copies = borrowed_copies + 1, update_time = $2 WHERE id = $1",
        )
        .bind(book_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Close a ledger row and decrement the book's `borrowed_copies` in one
    /// transaction. The status written is Returned for an on-time return,
    /// Overdue for a late one; `Returned`/`Overdue` are terminal.
    pub async fn return_borrow(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Lock the open row; a concurrent return of the same record finds no
        // open row and fails without touching the copy count.
        let open = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT * FROM borrow_records
            WHERE id = $1 AND actual_return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("borrow record not found or already returned".to_string())
        })?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET actual_return_date = $2, status = $3, update_time = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(now)
        .bind(i16::from(close_status(open.due_date, now)))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(book_id) = record.book_id {
            // Floored at zero in case the counter was corrected out of band.
            sqlx::query(
                r#"
                UPDATE books
                SET borrowed_copies = GREATEST(borrowed_copies - 1, 0), update_time = $2
                WHERE id = $1
                "#,
            )
            .bind(book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    /// Extend the due date and bump the renewal counter in one transaction.
    /// The `renew_count < 1` guard in the update re-checks the single-renewal
    /// ceiling at commit time.
    pub async fn renew_borrow(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET due_date = due_date + make_interval(days => $2),
                renew_count = renew_count + 1,
                update_time = $3
            WHERE id = $1 AND actual_return_date IS NULL AND renew_count < 1
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(LOAN_DAYS as i32)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict("the record has already been renewed once".to_string()))?;

        tx.commit().await?;

        Ok(record)
    }

    /// Borrows per month over a date range, for the reporting projector
    pub async fn borrow_counts_by_month(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT to_char(date_trunc('month', borrow_date), 'YYYY-MM') AS month,
                   COUNT(*) AS count
            FROM borrow_records
            WHERE borrow_date >= $1 AND borrow_date < $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.get::<String, _>("month"), r.get::<i64, _>("count")))
            .collect())
    }
}
