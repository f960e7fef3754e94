//! Catalog (book) endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{
        book::{BookPageQuery, CreateBookRequest, UpdateBookRequest},
        Book, PageResult,
    },
};

use super::{AuthenticatedAdmin, ChangeStatusRequest, IdQuery, OkData, OkMessage};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Paged catalog list
#[utoipa::path(
    get,
    path = "/book/querypage",
    tag = "book",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page"),
        ("name" = Option<String>, Query, description = "Title substring"),
        ("begin" = Option<String>, Query, description = "Earliest publish date"),
        ("end" = Option<String>, Query, description = "Latest publish date")
    ),
    responses((status = 200, description = "One page of books"))
)]
pub async fn query_page(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<BookPageQuery>,
) -> AppResult<Json<OkData<PageResult<Book>>>> {
    let page = state.services.books.get_page(&query).await?;
    Ok(Json(OkData::new(page)))
}

/// Borrowable titles (active with a free copy)
#[utoipa::path(
    get,
    path = "/book/available",
    tag = "book",
    security(("bearer_auth" = [])),
    params(
        ("keyword" = Option<String>, Query, description = "Title or author substring"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page")
    ),
    responses((status = 200, description = "One page of borrowable books"))
)]
pub async fn available(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<OkData<PageResult<Book>>>> {
    let page = state
        .services
        .books
        .get_available(query.keyword.as_deref(), query.page, query.page_size)
        .await?;
    Ok(Json(OkData::new(page)))
}

/// Single book by ID
#[utoipa::path(
    get,
    path = "/book/get",
    tag = "book",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Book ID")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkData<Book>>> {
    let book = state.services.books.get_by_id(query.id).await?;
    Ok(Json(OkData::new(book)))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/book/add",
    tag = "book",
    security(("bearer_auth" = [])),
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Book created", body = OkMessage),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn add(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CreateBookRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.books.create(request).await?;
    Ok(Json(OkMessage::new("book created successfully")))
}

/// Update a book's scalar fields
#[utoipa::path(
    put,
    path = "/book/update",
    tag = "book",
    security(("bearer_auth" = [])),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = OkMessage),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<UpdateBookRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.books.update(request).await?;
    Ok(Json(OkMessage::new("book updated successfully")))
}

/// Withdraw or restore a title
#[utoipa::path(
    post,
    path = "/book/changestatus",
    tag = "book",
    security(("bearer_auth" = [])),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OkMessage),
        (status = 400, description = "Unreturned borrows block withdrawal")
    )
)]
pub async fn change_status(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<ChangeStatusRequest>,
) -> AppResult<Json<OkMessage>> {
    state
        .services
        .books
        .change_status(request.id, request.status)
        .await?;
    Ok(Json(OkMessage::new("book status changed successfully")))
}

/// Soft-delete a title
#[utoipa::path(
    delete,
    path = "/book/delete",
    tag = "book",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = OkMessage),
        (status = 400, description = "Unreturned borrows block deletion")
    )
)]
pub async fn delete(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.books.delete(query.id).await?;
    Ok(Json(OkMessage::new("book deleted successfully")))
}
