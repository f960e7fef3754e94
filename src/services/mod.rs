//! Business logic services

pub mod auth;
pub mod books;
pub mod borrows;
pub mod categories;
pub mod chat;
pub mod publishers;
pub mod reports;
pub mod users;

use crate::{
    config::{AuthConfig, ChatConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub borrows: borrows::BorrowsService,
    pub categories: categories::CategoriesService,
    pub publishers: publishers::PublishersService,
    pub reports: reports::ReportsService,
    pub chat: chat::ChatService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, chat_config: ChatConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            books: books::BooksService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            publishers: publishers::PublishersService::new(repository.clone()),
            reports: reports::ReportsService::new(repository.clone()),
            chat: chat::ChatService::new(repository.clone(), chat_config),
            repository,
        }
    }
}
