//! Borrowing engine: the Borrow/Return/Renew lifecycle.
//!
//! The engine is the sole writer of borrow records and of the books'
//! `borrowed_copies` counter. Each operation validates its precondition chain
//! here, then hands the atomic effect to the repository, which executes it in
//! a single transaction (ledger write + copy-count update commit together or
//! not at all). A failed operation leaves no partial state behind.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{
            BorrowPageQuery, BorrowRecordDto, BorrowRequest, MAX_ACTIVE_BORROWS, MAX_RENEWALS,
            RENEW_GRACE_DAYS,
        },
        page::clamp_pagination,
        Book, BorrowRecord, BorrowStatus, PageResult, PatronLookup, User,
    },
    repository::Repository,
};

/// Book-side borrow preconditions: not withdrawn, at least one free copy.
/// Checked before the patron is even resolved, so a withdrawn or exhausted
/// title fails the same way regardless of who asks.
fn check_book_borrowable(book: &Book) -> AppResult<()> {
    if !book.is_active() {
        return Err(AppError::Conflict(
            "the book has been withdrawn and cannot be borrowed".to_string(),
        ));
    }
    if book.borrowed_copies >= book.total_copies {
        return Err(AppError::Conflict("no copies available".to_string()));
    }
    Ok(())
}

/// Patron-side borrow preconditions: active account, under the concurrent
/// borrow ceiling, not already holding this title.
fn check_patron_eligibility(
    patron: &User,
    active_count: i64,
    already_borrowing: bool,
) -> AppResult<()> {
    if !patron.is_active() {
        return Err(AppError::Conflict(
            "the patron account is disabled".to_string(),
        ));
    }
    if active_count >= MAX_ACTIVE_BORROWS {
        return Err(AppError::Conflict(format!(
            "borrow limit reached: at most {} books may be out at once",
            MAX_ACTIVE_BORROWS
        )));
    }
    if already_borrowing {
        return Err(AppError::Conflict(
            "this patron is already borrowing this book".to_string(),
        ));
    }
    Ok(())
}

/// Renewal preconditions, in order: still open, still in the Borrowing state,
/// never renewed before, and within the overdue grace window.
fn check_renewal(record: &BorrowRecord, now: DateTime<Utc>) -> AppResult<()> {
    if record.is_returned() {
        return Err(AppError::Conflict(
            "the book has been returned and cannot be renewed".to_string(),
        ));
    }
    if record.status != i16::from(BorrowStatus::Borrowing) {
        return Err(AppError::Conflict(
            "only active borrows can be renewed".to_string(),
        ));
    }
    if record.renew_count >= MAX_RENEWALS {
        return Err(AppError::Conflict(
            "the record has already been renewed once".to_string(),
        ));
    }
    if now > record.due_date + Duration::days(RENEW_GRACE_DAYS) {
        return Err(AppError::Conflict(
            "the loan is overdue for too long to be renewed".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Paged borrow-record projection for the admin console
    pub async fn get_page(
        &self,
        query: &BorrowPageQuery,
    ) -> AppResult<PageResult<BorrowRecordDto>> {
        let (page, page_size) = clamp_pagination(query.page, query.page_size);
        let (rows, total) = self
            .repository
            .borrows
            .get_page(page, page_size, query.user_name.as_deref(), query.status)
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    /// Borrow a book for a patron identified by id or card number / name.
    ///
    /// Preconditions are checked in a fixed order, first failure wins; the
    /// stock check is repeated under a row lock inside the repository
    /// transaction, so a retried Borrow always re-validates against fresh
    /// state.
    pub async fn borrow(&self, request: &BorrowRequest) -> AppResult<BorrowRecord> {
        let lookup = PatronLookup::parse(&request.user_input).ok_or_else(|| {
            AppError::Validation("the patron identifier must not be empty".to_string())
        })?;

        let book = self
            .repository
            .books
            .find_by_id(request.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;
        check_book_borrowable(&book)?;

        let patron = match &lookup {
            PatronLookup::ById(id) => self.repository.users.find_by_id(*id).await?,
            PatronLookup::ByCard(input) => {
                self.repository.users.find_by_card_or_name(input).await?
            }
        }
        .ok_or_else(|| {
            AppError::NotFound("patron not found, check the id or card number".to_string())
        })?;

        let active_count = self
            .repository
            .borrows
            .active_borrow_count(patron.id)
            .await?;
        let already_borrowing = self
            .repository
            .borrows
            .find_open_by_user_and_book(patron.id, book.id)
            .await?
            .is_some();
        check_patron_eligibility(&patron, active_count, already_borrowing)?;

        let record = self
            .repository
            .borrows
            .create_borrow(book.id, patron.id)
            .await?;

        tracing::info!(
            record_id = record.id,
            book_id = book.id,
            user_id = patron.id,
            "book borrowed"
        );

        Ok(record)
    }

    /// Return a borrowed book. The record closes as Returned when on time,
    /// Overdue when late; either way the book's copy count comes back down.
    pub async fn return_borrow(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let record = self
            .repository
            .borrows
            .find_by_id(record_id)
            .await?
            .filter(|r| !r.is_returned())
            .ok_or_else(|| {
                AppError::Conflict("borrow record not found or already returned".to_string())
            })?;

        let book_id = record.book_id.ok_or_else(|| {
            AppError::Conflict("the associated book no longer exists".to_string())
        })?;
        self.repository
            .books
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("the associated book no longer exists".to_string())
            })?;

        let record = self.repository.borrows.return_borrow(record_id).await?;

        tracing::info!(
            record_id = record.id,
            status = record.status,
            "book returned"
        );

        Ok(record)
    }

    /// Renew a loan once, extending the due date by the loan length
    pub async fn renew(&self, record_id: i32) -> AppResult<BorrowRecord> {
        let record = self
            .repository
            .borrows
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound("borrow record not found".to_string()))?;

        check_renewal(&record, Utc::now())?;

        let record = self.repository.borrows.renew_borrow(record_id).await?;

        tracing::info!(
            record_id = record.id,
            renew_count = record.renew_count,
            "loan renewed"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn book(status: i16, total: i32, borrowed: i32) -> Book {
        Book {
            id: 1,
            name: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            publish_date: NaiveDate::from_ymd_opt(1969, 3, 1).unwrap(),
            price: Decimal::new(1850, 2),
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

    fn patron(status: i16) -> User {
        User {
            id: 9,
            name: "Ada".to_string(),
            phone: None,
            email: None,
            card_number: "LIB-0009".to_string(),
            status,
            create_time: Utc::now(),
        }
    }

    fn open_record(due_in_days: i64, renew_count: i16) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id: 1,
            book_id: Some(1),
            user_id: 9,
            borrow_date: now - Duration::days(30 - due_in_days),
            due_date: now + Duration::days(due_in_days),
            actual_return_date: None,
            status: i16::from(BorrowStatus::Borrowing),
            renew_count,
            create_time: now,
            update_time: now,
        }
    }

    fn conflict_msg(result: AppResult<()>) -> String {
        match result {
            Err(AppError::Conflict(msg)) => msg,
            other => panic!("expected Conflict, got {:?}", other.err()),
        }
    }

    #[test]
    fn active_book_with_free_copy_is_borrowable() {
        assert!(check_book_borrowable(&book(1, 2, 0)).is_ok());
    }

    #[test]
    fn withdrawn_book_is_rejected_before_stock() {
        // A withdrawn title with no free copies reports withdrawal, not stock
        let msg = conflict_msg(check_book_borrowable(&book(2, 1, 1)));
        assert!(msg.contains("withdrawn"));
    }

    #[test]
    fn exhausted_stock_is_rejected() {
        let msg = conflict_msg(check_book_borrowable(&book(1, 2, 2)));
        assert!(msg.contains("no copies"));
    }

    #[test]
    fn eligible_patron_passes() {
        assert!(check_patron_eligibility(&patron(1), 0, false).is_ok());
    }

    #[test]
    fn disabled_patron_is_rejected_first() {
        let msg = conflict_msg(check_patron_eligibility(&patron(0), 5, true));
        assert!(msg.contains("disabled"));
    }

    #[test]
    fn borrow_limit_is_enforced_at_five() {
        assert!(check_patron_eligibility(&patron(1), 4, false).is_ok());
        let msg = conflict_msg(check_patron_eligibility(&patron(1), 5, false));
        assert!(msg.contains("borrow limit"));
    }

    #[test]
    fn duplicate_open_borrow_of_same_title_is_rejected() {
        let msg = conflict_msg(check_patron_eligibility(&patron(1), 1, true));
        assert!(msg.contains("already borrowing"));
    }

    #[test]
    fn open_record_within_due_date_can_renew() {
        assert!(check_renewal(&open_record(10, 0), Utc::now()).is_ok());
    }

    #[test]
    fn returned_record_cannot_renew() {
        let mut record = open_record(10, 0);
        record.actual_return_date = Some(Utc::now());
        record.status = i16::from(BorrowStatus::Returned);
        let msg = conflict_msg(check_renewal(&record, Utc::now()));
        assert!(msg.contains("returned"));
    }

    #[test]
    fn second_renewal_is_rejected() {
        let msg = conflict_msg(check_renewal(&open_record(10, 1), Utc::now()));
        assert!(msg.contains("already been renewed"));
    }

    #[test]
    fn renewal_within_grace_window_is_accepted() {
        // 6 days past due, grace is 7
        assert!(check_renewal(&open_record(-6, 0), Utc::now()).is_ok());
    }

    #[test]
    fn renewal_past_grace_window_is_rejected() {
        let msg = conflict_msg(check_renewal(&open_record(-8, 0), Utc::now()));
        assert!(msg.contains("overdue"));
    }

    #[test]
    fn record_marked_overdue_cannot_renew() {
        let mut record = open_record(-2, 0);
        record.status = i16::from(BorrowStatus::Overdue);
        let msg = conflict_msg(check_renewal(&record, Utc::now()));
        assert!(msg.contains("active borrows"));
    }

    #[test]
    fn open_record_past_due_reads_as_overdue() {
        let record = open_record(-1, 0);
        assert!(record.is_overdue_at(Utc::now()));
        assert!(!open_record(1, 0).is_overdue_at(Utc::now()));
    }
}
