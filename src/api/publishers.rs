//! Publisher endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{publisher::PublisherRequest, PageResult, Publisher},
};

use super::{AuthenticatedAdmin, IdQuery, OkData, OkMessage};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherPageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub name: Option<String>,
}

/// All publishers, for dropdowns
#[utoipa::path(
    get,
    path = "/publisher/list",
    tag = "publisher",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All publishers"))
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<OkData<Vec<Publisher>>>> {
    let publishers = state.services.publishers.get_all().await?;
    Ok(Json(OkData::new(publishers)))
}

/// Paged publisher list
#[utoipa::path(
    get,
    path = "/publisher/querypage",
    tag = "publisher",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page"),
        ("name" = Option<String>, Query, description = "Name substring")
    ),
    responses((status = 200, description = "One page of publishers"))
)]
pub async fn query_page(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<PublisherPageQuery>,
) -> AppResult<Json<OkData<PageResult<Publisher>>>> {
    let page = state
        .services
        .publishers
        .get_page(query.page, query.page_size, query.name.as_deref())
        .await?;
    Ok(Json(OkData::new(page)))
}

/// Create a publisher
#[utoipa::path(
    post,
    path = "/publisher/add",
    tag = "publisher",
    security(("bearer_auth" = [])),
    request_body = PublisherRequest,
    responses((status = 200, description = "Publisher created", body = OkMessage))
)]
pub async fn add(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<PublisherRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.publishers.create(request).await?;
    Ok(Json(OkMessage::new("publisher created successfully")))
}

/// Update a publisher
#[utoipa::path(
    put,
    path = "/publisher/update",
    tag = "publisher",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Publisher ID")),
    request_body = PublisherRequest,
    responses(
        (status = 200, description = "Publisher updated", body = OkMessage),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn update(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
    Json(request): Json<PublisherRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.publishers.update(query.id, request).await?;
    Ok(Json(OkMessage::new("publisher updated successfully")))
}

/// Delete a publisher (refused while books reference it)
#[utoipa::path(
    delete,
    path = "/publisher/delete",
    tag = "publisher",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher deleted", body = OkMessage),
        (status = 400, description = "Books still reference this publisher")
    )
)]
pub async fn delete(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.publishers.delete(query.id).await?;
    Ok(Json(OkMessage::new("publisher deleted successfully")))
}
