//! Data models for Libris

pub mod admin;
pub mod book;
pub mod borrow;
pub mod category;
pub mod enums;
pub mod page;
pub mod publisher;
pub mod user;

// Re-export commonly used types
pub use admin::Admin;
pub use book::Book;
pub use borrow::{BorrowRecord, BorrowRecordDto};
pub use category::Category;
pub use enums::{BookStatus, BorrowStatus, UserStatus};
pub use page::PageResult;
pub use publisher::Publisher;
pub use user::{PatronLookup, User};
