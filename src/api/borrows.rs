//! Borrowing endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::borrow::{BorrowPageQuery, BorrowRequest},
};

use super::{AuthenticatedAdmin, IdQuery, OkData, OkMessage};

/// Paged borrow-record list for the admin console
#[utoipa::path(
    get,
    path = "/borrow/querypage",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<i64>, Query, description = "Rows per page, at most 100"),
        ("userName" = Option<String>, Query, description = "Patron name substring"),
        ("status" = Option<i16>, Query, description = "1 = borrowing, 2 = returned, 3 = overdue")
    ),
    responses(
        (status = 200, description = "One page of borrow records")
    )
)]
pub async fn query_page(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<BorrowPageQuery>,
) -> AppResult<Json<OkData<crate::models::PageResult<crate::models::BorrowRecordDto>>>> {
    let page = state.services.borrows.get_page(&query).await?;
    Ok(Json(OkData::new(page)))
}

/// Borrow a book for a patron
#[utoipa::path(
    post,
    path = "/borrow/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Borrow recorded", body = OkMessage),
        (status = 400, description = "Borrowing rule violated"),
        (status = 404, description = "Book or patron not found")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<OkMessage>> {
    state.services.borrows.borrow(&request).await?;
    Ok(Json(OkMessage::new("book borrowed successfully")))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrow/return",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Return recorded", body = OkMessage),
        (status = 400, description = "Record missing or already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.borrows.return_borrow(query.id).await?;
    Ok(Json(OkMessage::new("book returned successfully")))
}

/// Renew a loan (once per record)
#[utoipa::path(
    post,
    path = "/borrow/renew",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Query, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Loan renewed", body = OkMessage),
        (status = 400, description = "Renewal rule violated"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn renew(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<OkMessage>> {
    state.services.borrows.renew(query.id).await?;
    Ok(Json(OkMessage::new("loan renewed successfully")))
}
