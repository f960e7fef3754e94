//! Borrow record (ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::BorrowStatus;

/// Loan length granted on borrow and added again on renewal
pub const LOAN_DAYS: i64 = 30;
/// Maximum simultaneously open records per patron
pub const MAX_ACTIVE_BORROWS: i64 = 5;
/// Each record may be renewed at most once
pub const MAX_RENEWALS: i16 = 1;
/// Days past the due date during which a renewal is still accepted
pub const RENEW_GRACE_DAYS: i64 = 7;

/// Borrow record from database. Rows are never deleted; the ledger is the
/// permanent history of borrowing events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: i32,
    /// Nullable: the referenced title may be soft-deleted from the catalog
    /// after the record closed
    pub book_id: Option<i32>,
    pub user_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// `None` while the book is still out
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: i16,
    pub renew_count: i16,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl BorrowRecord {
    pub fn is_returned(&self) -> bool {
        self.actual_return_date.is_some()
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.actual_return_date.is_none() && now > self.due_date
    }
}

/// Status written when a record closes: Returned on time, Overdue when the
/// book comes back after its due date.
pub fn close_status(due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> BorrowStatus {
    if returned_at > due_date {
        BorrowStatus::Overdue
    } else {
        BorrowStatus::Returned
    }
}

/// Borrow record projection for the admin console list
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecordDto {
    pub id: i32,
    pub book_id: Option<i32>,
    pub book_name: String,
    pub user_id: i32,
    pub user_name: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: i16,
    pub renew_count: i16,
    /// Computed at query time: still out and past due
    pub is_overdue: bool,
}

/// Borrow request from the admin console
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: i32,
    /// Patron id or card number / name, disambiguated by the engine
    pub user_input: String,
}

/// Paged borrow-record query parameters
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Substring match on the patron name
    pub user_name: Option<String>,
    /// 1 = open and not yet due, 2 = returned, 3 = open and past due
    pub status: Option<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn on_time_return_closes_as_returned() {
        let due = Utc::now();
        assert_eq!(close_status(due, due - Duration::days(3)), BorrowStatus::Returned);
    }

    #[test]
    fn return_exactly_at_due_date_closes_as_returned() {
        let due = Utc::now();
        assert_eq!(close_status(due, due), BorrowStatus::Returned);
    }

    #[test]
    fn late_return_closes_as_overdue() {
        let due = Utc::now();
        assert_eq!(close_status(due, due + Duration::seconds(1)), BorrowStatus::Overdue);
        assert_eq!(close_status(due, due + Duration::days(10)), BorrowStatus::Overdue);
    }
}
