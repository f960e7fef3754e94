//! Category management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{category::CategoryRequest, page::clamp_pagination, Category, PageResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.get_all().await
    }

    pub async fn get_page(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        name: Option<&str>,
    ) -> AppResult<PageResult<Category>> {
        let (page, page_size) = clamp_pagination(page, page_size);
        let (rows, total) = self
            .repository
            .categories
            .get_page(page, page_size, name)
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    pub async fn create(&self, req: CategoryRequest) -> AppResult<Category> {
        req.validate()?;
        self.repository.categories.create(&req).await
    }

    pub async fn update(&self, id: i32, req: CategoryRequest) -> AppResult<Category> {
        req.validate()?;
        self.repository.categories.get_by_id(id).await?;
        self.repository.categories.update(id, &req).await
    }

    /// Delete a category, refused while books still reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.categories.get_by_id(id).await?;
        let in_use = self.repository.books.count_by_category(id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "{} books still reference this category",
                in_use
            )));
        }
        self.repository.categories.delete(id).await
    }
}
