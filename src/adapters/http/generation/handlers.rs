//! HTTP handler for the streaming generation endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, HeaderValue},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;

use super::dto::GenerateRequest;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{add_rate_limit_headers, Caller};
use crate::application::{GenerateRecipeCommand, GenerateRecipeHandler};
use crate::domain::recipe::StreamFrame;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct GenerationHandlers {
    handler: Arc<GenerateRecipeHandler>,
}

impl GenerationHandlers {
    pub fn new(handler: Arc<GenerateRecipeHandler>) -> Self {
        Self { handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/generate - Stream a recipe as Server-Sent Events
///
/// Each event is one `data: <json>\n\n` frame. Quota and validation failures
/// are answered before the stream starts.
pub async fn generate_recipe(
    State(handlers): State<GenerationHandlers>,
    Caller(identity): Caller,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    let cmd = GenerateRecipeCommand::new(identity, req.ingredients);

    let started = match handlers.handler.handle(cmd).await {
        Ok(started) => started,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let frames = started
        .events
        .map(|event| Ok::<_, Infallible>(Event::default().data(StreamFrame::new(event).to_json())));

    let mut response = Sse::new(frames).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if let Ok(value) = HeaderValue::from_str(&started.request_id.to_string()) {
        headers.insert(X_REQUEST_ID.clone(), value);
    }
    if let Some(status) = &started.rate_status {
        add_rate_limit_headers(headers, status);
    }
    response
}
