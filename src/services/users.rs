//! Patron (user) management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::UserStatus,
        page::clamp_pagination,
        user::{CreateUserRequest, UpdateUserRequest, UserPageQuery},
        PageResult, User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_page(&self, query: &UserPageQuery) -> AppResult<PageResult<User>> {
        let (page, page_size) = clamp_pagination(query.page, query.page_size);
        let (rows, total) = self
            .repository
            .users
            .get_page(
                page,
                page_size,
                query.name.as_deref(),
                query.phone.as_deref(),
                query.card_number.as_deref(),
            )
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, req: CreateUserRequest) -> AppResult<User> {
        req.validate()?;
        if self
            .repository
            .users
            .card_number_exists(&req.card_number, None)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "card number {} already exists",
                req.card_number
            )));
        }
        self.repository.users.create(&req).await
    }

    pub async fn update(&self, id: i32, req: UpdateUserRequest) -> AppResult<User> {
        req.validate()?;
        let existing = self.repository.users.get_by_id(id).await?;
        if existing.card_number != req.card_number
            && self
                .repository
                .users
                .card_number_exists(&req.card_number, Some(id))
                .await?
        {
            return Err(AppError::Conflict(format!(
                "card number {} already exists",
                req.card_number
            )));
        }
        self.repository.users.update(id, &req).await
    }

    /// Enable or disable a patron. Disabling is blocked while the patron has
    /// an unreturned borrow.
    pub async fn change_status(&self, id: i32, status: i16) -> AppResult<()> {
        let status = UserStatus::from_i16(status)
            .ok_or_else(|| AppError::Validation("unknown user status".to_string()))?;
        self.repository.users.get_by_id(id).await?;

        if status == UserStatus::Disabled
            && self.repository.borrows.has_active_borrow(id).await?
        {
            return Err(AppError::Conflict(
                "the patron has unreturned books and cannot be disabled".to_string(),
            ));
        }

        self.repository.users.change_status(id, status.into()).await
    }

    /// Delete a patron. Blocked while an unreturned borrow exists.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        if self.repository.borrows.has_active_borrow(id).await? {
            return Err(AppError::Conflict(
                "the patron has unreturned books and cannot be deleted".to_string(),
            ));
        }

        self.repository.users.delete(id).await
    }
}
