//! HTTP handlers for ingredient validation and autocomplete.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{AutocompleteQuery, ValidateIngredientRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{add_rate_limit_headers, Caller};
use crate::application::IngredientLookupHandler;
use crate::domain::ingredient::DEFAULT_AUTOCOMPLETE_LIMIT;

const MAX_AUTOCOMPLETE_LIMIT: usize = 25;

#[derive(Clone)]
pub struct IngredientHandlers {
    lookup: Arc<IngredientLookupHandler>,
}

impl IngredientHandlers {
    pub fn new(lookup: Arc<IngredientLookupHandler>) -> Self {
        Self { lookup }
    }
}

/// POST /api/ingredients/validate - Match one ingredient against the catalog
pub async fn validate_ingredient(
    State(handlers): State<IngredientHandlers>,
    Caller(identity): Caller,
    payload: Result<Json<ValidateIngredientRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    match handlers.lookup.validate(&identity, &req.ingredient).await {
        Ok(validated) => {
            let mut response = (StatusCode::OK, Json(validated.result)).into_response();
            if let Some(status) = &validated.rate_status {
                add_rate_limit_headers(response.headers_mut(), status);
            }
            response
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/ingredients/autocomplete?q=<prefix> - Suggestions, no quota used
pub async fn autocomplete(
    State(handlers): State<IngredientHandlers>,
    Query(query): Query<AutocompleteQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT)
        .min(MAX_AUTOCOMPLETE_LIMIT);
    let suggestions = handlers.lookup.autocomplete(&query.q, limit);
    (StatusCode::OK, Json(suggestions)).into_response()
}
