//! API handlers for Libris REST endpoints

pub mod auth;
pub mod books;
pub mod borrows;
pub mod categories;
pub mod chat;
pub mod health;
pub mod openapi;
pub mod publishers;
pub mod reports;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, models::admin::AdminClaims, AppState};

/// Extractor for an authenticated admin from the JWT bearer token
pub struct AuthenticatedAdmin(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Authentication("invalid authorization header format".to_string())
        })?;

        let claims = AdminClaims::from_token(
            token,
            &state.config.auth.jwt_secret,
            &state.config.auth.jwt_issuer,
        )
        .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedAdmin(claims))
    }
}

/// Success envelope with a human-readable message
#[derive(Serialize, ToSchema)]
pub struct OkMessage {
    /// Always `true` for successes
    pub code: bool,
    pub msg: String,
}

impl OkMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            code: true,
            msg: msg.into(),
        }
    }
}

/// Success envelope carrying a payload
#[derive(Serialize)]
pub struct OkData<T> {
    pub code: bool,
    pub data: T,
}

impl<T> OkData<T> {
    pub fn new(data: T) -> Self {
        Self { code: true, data }
    }
}

/// Query parameter for the `?id=` endpoints
#[derive(Deserialize, ToSchema)]
pub struct IdQuery {
    pub id: i32,
}

/// Status-change payload shared by book and user endpoints
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub id: i32,
    pub status: i16,
}
