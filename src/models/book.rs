//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::BookStatus;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub author: String,
    pub publish_date: NaiveDate,
    pub price: Decimal,
    pub category_id: i32,
    pub publisher_id: i32,
    /// Total owned copies
    pub total_copies: i32,
    /// Copies currently lent out; mutated only by the borrowing engine
    pub borrowed_copies: i32,
    pub status: i16,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Book {
    pub fn is_active(&self) -> bool {
        self.status == i16::from(BookStatus::Active)
    }

    /// Borrowable: not withdrawn and at least one copy on the shelf
    pub fn is_available(&self) -> bool {
        self.is_active() && self.borrowed_copies < self.total_copies
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    pub publish_date: NaiveDate,
    pub price: Decimal,
    pub category_id: i32,
    pub publisher_id: i32,
    #[validate(range(min = 0))]
    pub total_copies: i32,
}

/// Update book request (scalar fields only; copy counts are owned by the
/// borrowing engine and cannot be set here)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    pub publish_date: NaiveDate,
    pub price: Decimal,
    pub category_id: i32,
    pub publisher_id: i32,
    #[validate(range(min = 0))]
    pub total_copies: i32,
}

/// Paged book query parameters
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Substring match on the title
    pub name: Option<String>,
    /// Publish date range, inclusive
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample(status: i16, total: i32, borrowed: i32) -> Book {
        Book {
            id: 1,
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publish_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            price: Decimal::new(2999, 2),
            category_id: 1,
            publisher_id: 1,
            total_copies: total,
            borrowed_copies: borrowed,
            status,
            is_deleted: false,
            create_time: Utc::now(),
            update_time: Utc::now(),
        }
    }

    #[test]
    fn available_when_active_with_free_copy() {
        assert!(sample(1, 2, 1).is_available());
    }

    #[test]
    fn not_available_when_all_copies_out() {
        assert!(!sample(1, 2, 2).is_available());
    }

    #[test]
    fn not_available_when_withdrawn() {
        assert!(!sample(2, 2, 0).is_available());
    }
}
