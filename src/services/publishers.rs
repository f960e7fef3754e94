//! Publisher management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{page::clamp_pagination, publisher::PublisherRequest, PageResult, Publisher},
    repository::Repository,
};

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.get_all().await
    }

    pub async fn get_page(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        name: Option<&str>,
    ) -> AppResult<PageResult<Publisher>> {
        let (page, page_size) = clamp_pagination(page, page_size);
        let (rows, total) = self
            .repository
            .publishers
            .get_page(page, page_size, name)
            .await?;
        Ok(PageResult {
            total,
            page,
            page_size,
            rows,
        })
    }

    pub async fn create(&self, req: PublisherRequest) -> AppResult<Publisher> {
        req.validate()?;
        self.repository.publishers.create(&req).await
    }

    pub async fn update(&self, id: i32, req: PublisherRequest) -> AppResult<Publisher> {
        req.validate()?;
        self.repository.publishers.get_by_id(id).await?;
        self.repository.publishers.update(id, &req).await
    }

    /// Delete a publisher, refused while books still reference it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.publishers.get_by_id(id).await?;
        let in_use = self.repository.books.count_by_publisher(id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "{} books still reference this publisher",
                in_use
            )));
        }
        self.repository.publishers.delete(id).await
    }
}
