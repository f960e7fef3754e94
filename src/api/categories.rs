//! Category endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{category::CategoryRequest, Category, PageResult},
};

use super::{AuthenticatedAdmin, IdQuery, OkData, OkMessage};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub name: Option<String>,
}

/// All categories, for dropdowns
#[utoipa::path(
    get,
    path = "/category/list",
    tag = "category",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All categories"))
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<OkData<Vec<Category>>>> {
    let categories = state.services.categories.get_all().await?;
    Ok(Json(OkData::new(categories)))
}

/// Paged category list
#[utoipa::path(
    get,
    path = "/category/querypage",
    tag = "category",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page"),
        ("name" = Option<String>, Query, description = "Name substring")
    ),
    responses((status = 200, description = "One page of categories"))
)]
pub async fn query_page(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<CategoryPageQuery>,
) -> AppResult<Json<OkData<PageResult<Category>>>> {
    let page = state
        .services
        .categories
        .get_page(query.page, query.page_size, query.name.as_deref())
        .await?;
    Ok(Json(OkData::new(page)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/category/add",
    tag = "category",
    security(("bearer_auth" = [])),
    request_body = CategoryRequest,
    responses((status = 200, description = "Category created", body = OkMessage))
)]
pub async fn add(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CategoryRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.categories.create(request).await?;
    Ok(Json(OkMessage::new("category created successfully")))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/category/update",
    tag = "category",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = OkMessage),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
    Json(request): Json<CategoryRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.categories.update(query.id, request).await?;
    Ok(Json(OkMessage::new("category updated successfully")))
}

/// Delete a category (refused while books reference it)
#[utoipa::path(
    delete,
    path = "/category/delete",
    tag = "category",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = OkMessage),
        (status = 400, description = "Books still reference this category")
    )
)]
pub async fn delete(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.categories.delete(query.id).await?;
    Ok(Json(OkMessage::new("category deleted successfully")))
}
