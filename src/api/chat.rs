//! Chat assistant endpoint (SSE token stream)

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::StreamExt;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppResult;

use super::AuthenticatedAdmin;

/// Chat request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Ask the librarian assistant a question; the answer streams back token by
/// token as SSE `data:` events, ending with a `done` event.
#[utoipa::path(
    post,
    path = "/chat/stream",
    tag = "chat",
    security(("bearer_auth" = [])),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "SSE token stream"),
        (status = 500, description = "Upstream completion failed")
    )
)]
pub async fn stream(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(request): Json<ChatRequest>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    request.validate()?;

    let tokens = state.services.chat.ask_stream(&request.message).await?;

    let events = tokens
        .map(|token| match token {
            Ok(token) => Ok(Event::default().data(token)),
            Err(e) => {
                tracing::error!("chat stream error: {}", e);
                Ok(Event::default().event("error").data("stream interrupted"))
            }
        })
        .chain(tokio_stream::once(Ok(Event::default().event("done").data(""))));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
