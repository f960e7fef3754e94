//! Patron (user) endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        user::{CreateUserRequest, UpdateUserRequest, UserPageQuery},
        PageResult, User,
    },
};

use super::{AuthenticatedAdmin, ChangeStatusRequest, IdQuery, OkData, OkMessage};

/// Paged patron list
#[utoipa::path(
    get,
    path = "/user/querypage",
    tag = "user",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page"),
        ("name" = Option<String>, Query, description = "Name substring"),
        ("phone" = Option<String>, Query, description = "Phone substring"),
        ("cardNumber" = Option<String>, Query, description = "Card number substring")
    ),
    responses((status = 200, description = "One page of patrons"))
)]
pub async fn query_page(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<UserPageQuery>,
) -> AppResult<Json<OkData<PageResult<User>>>> {
    let page = state.services.users.get_page(&query).await?;
    Ok(Json(OkData::new(page)))
}

/// Single patron by ID
#[utoipa::path(
    get,
    path = "/user/get",
    tag = "user",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "User ID")),
    responses(
        (status = 200, description = "The patron", body = User),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkData<User>>> {
    let user = state.services.users.get_by_id(query.id).await?;
    Ok(Json(OkData::new(user)))
}

/// Register a patron
#[utoipa::path(
    post,
    path = "/user/add",
    tag = "user",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Patron created", body = OkMessage),
        (status = 400, description = "Duplicate card number or invalid payload")
    )
)]
pub async fn add(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.users.create(request).await?;
    Ok(Json(OkMessage::new("patron created successfully")))
}

/// Update a patron's details
#[utoipa::path(
    put,
    path = "/user/update",
    tag = "user",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Patron updated", body = OkMessage),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn update(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.users.update(query.id, request).await?;
    Ok(Json(OkMessage::new("patron updated successfully")))
}

/// Enable or disable a patron
#[utoipa::path(
    post,
    path = "/user/changestatus",
    tag = "user",
    security(("bearer_auth" = [])),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OkMessage),
        (status = 400, description = "Unreturned borrows block disabling")
    )
)]
pub async fn change_status(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<ChangeStatusRequest>,
) -> AppResult<Json<OkMessage>> {
    state
        .services
        .users
        .change_status(request.id, request.status)
        .await?;
    Ok(Json(OkMessage::new("patron status changed successfully")))
}

/// Delete a patron
#[utoipa::path(
    delete,
    path = "/user/delete",
    tag = "user",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "User ID")),
    responses(
        (status = 200, description = "Patron deleted", body = OkMessage),
        (status = 400, description = "Unreturned borrows block deletion")
    )
)]
pub async fn delete(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.users.delete(query.id).await?;
    Ok(Json(OkMessage::new("patron deleted successfully")))
}
