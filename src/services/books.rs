//! Catalog (books) service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookPageQuery, CreateBookRequest, UpdateBookRequest},
        enums::BookStatus,
        page::clamp_pagination,
        Book, PageResult,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_page(&self, query: &BookPageQuery) -> AppResult<PageResult<Book>> {
        let (page, page_size) = clamp_pagination(query.page, query.page_size);
        let (rows, total) = self
            .repository
            .books
            .get_page(page, page_size, query.name.as_deref(), query.begin, query.end)
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    pub async fn get_available(
        &self,
        keyword: Option<&str>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> AppResult<PageResult<Book>> {
        let (page, page_size) = clamp_pagination(page, page_size);
        let (rows, total) = self
            .repository
            .books
            .get_available(keyword, page, page_size)
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book with id {} not found", id)))
    }

    pub async fn create(&self, req: CreateBookRequest) -> AppResult<Book> {
        req.validate()?;
        self.repository.categories.get_by_id(req.category_id).await?;
        self.repository.publishers.get_by_id(req.publisher_id).await?;
        self.repository.books.create(&req).await
    }

    pub async fn update(&self, req: UpdateBookRequest) -> AppResult<Book> {
        req.validate()?;
        let existing = self.get_by_id(req.id).await?;
        // Shrinking the shelf below what is currently lent out would break
        // the borrowed <= total invariant.
        if req.total_copies < existing.borrowed_copies {
            return Err(AppError::Conflict(format!(
                "{} copies are currently lent out, total cannot go below that",
                existing.borrowed_copies
            )));
        }
        self.repository.books.update(&req).await
    }

    /// Withdraw or restore a title. Withdrawing is blocked while an
    /// unreturned borrow exists.
    pub async fn change_status(&self, id: i32, status: i16) -> AppResult<()> {
        let status = BookStatus::from_i16(status)
            .ok_or_else(|| AppError::Validation("unknown book status".to_string()))?;
        self.get_by_id(id).await?;

        if status == BookStatus::Withdrawn
            && self.repository.borrows.has_unreturned_record(id).await?
        {
            return Err(AppError::Conflict(
                "the book is currently borrowed and cannot be withdrawn".to_string(),
            ));
        }

        self.repository.books.change_status(id, status.into()).await
    }

    /// Soft delete a title. Blocked while an unreturned borrow exists; the
    /// ledger keeps its rows either way.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        if self.repository.borrows.has_unreturned_record(id).await? {
            return Err(AppError::Conflict(
                "the book is currently borrowed and cannot be deleted".to_string(),
            ));
        }

        self.repository.books.soft_delete(id).await
    }
}
