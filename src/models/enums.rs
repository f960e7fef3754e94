//! Shared domain enums (status codes match the persisted integer values)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// BookStatus
// ---------------------------------------------------------------------------

/// Catalog status of a book title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum BookStatus {
    Active = 1,
    Withdrawn = 2,
}

impl BookStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            1 => Some(BookStatus::Active),
            2 => Some(BookStatus::Withdrawn),
            _ => None,
        }
    }
}

impl From<BookStatus> for i16 {
    fn from(s: BookStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// UserStatus
// ---------------------------------------------------------------------------

/// Patron account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum UserStatus {
    Disabled = 0,
    Active = 1,
}

impl UserStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(UserStatus::Disabled),
            1 => Some(UserStatus::Active),
            _ => None,
        }
    }
}

impl From<UserStatus> for i16 {
    fn from(s: UserStatus) -> Self {
        s as i16
    }
}

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a borrow record.
///
/// `Returned` is terminal. `Overdue` is a stored snapshot written at return
/// time when the book came back late; while a record is still open the
/// projections expose a computed `is_overdue` flag instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum BorrowStatus {
    Borrowing = 1,
    Returned = 2,
    Overdue = 3,
}

impl BorrowStatus {
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            1 => Some(BorrowStatus::Borrowing),
            2 => Some(BorrowStatus::Returned),
            3 => Some(BorrowStatus::Overdue),
            _ => None,
        }
    }
}

impl From<BorrowStatus> for i16 {
    fn from(s: BorrowStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BorrowStatus::Borrowing => "borrowing",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
        };
        write!(f, "{}", label)
    }
}
