//! Mapping of application errors onto HTTP responses.
//!
//! Every error body is JSON with at least `{error, code}`. Provider and
//! storage details are logged, never returned.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::middleware::rate_limit_response;
use crate::application::{GenerateRecipeError, ValidateIngredientError};
use crate::domain::foundation::ValidationError;
use crate::domain::ingredient::{IngredientListError, IngredientViolation};
use crate::ports::{AIError, RateLimitDenied, RecipeStoreError};

/// JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<IngredientViolation>,
}

impl ErrorResponse {
    pub fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
            violations: Vec::new(),
        }
    }
}

/// Errors an API handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Ingredient list rejected; every violation is listed.
    InvalidIngredients(IngredientListError),
    /// Malformed input other than the ingredient list.
    BadRequest(String),
    RateLimited(RateLimitDenied),
    NotFound(&'static str),
    /// The AI provider could not start a generation.
    Upstream(AIError),
    /// Anything else; the detail is logged only.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidIngredients(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid ingredient list".to_string(),
                    code: "VALIDATION_FAILED",
                    violations: err.violations,
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message),
            ),
            ApiError::RateLimited(denied) => return rate_limit_response(&denied),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "Generation could not start");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("GENERATION_FAILED", err.user_message()),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "Something went wrong. Please try again."),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<GenerateRecipeError> for ApiError {
    fn from(err: GenerateRecipeError) -> Self {
        match err {
            GenerateRecipeError::RateLimited(denied) => ApiError::RateLimited(denied),
            GenerateRecipeError::InvalidIngredients(err) => ApiError::InvalidIngredients(err),
            GenerateRecipeError::Upstream(err) => ApiError::Upstream(err),
        }
    }
}

impl From<ValidateIngredientError> for ApiError {
    fn from(err: ValidateIngredientError) -> Self {
        match err {
            ValidateIngredientError::RateLimited(denied) => ApiError::RateLimited(denied),
        }
    }
}

impl From<RecipeStoreError> for ApiError {
    fn from(err: RecipeStoreError) -> Self {
        match err {
            RecipeStoreError::NotFound(_) => ApiError::NotFound("Recipe"),
            RecipeStoreError::Unavailable(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(detail = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Requests must be sent as JSON (Content-Type: application/json)."
            }
            JsonRejection::JsonSyntaxError(_) => "The request body is not valid JSON.",
            _ => "The request body does not have the expected fields.",
        };
        ApiError::BadRequest(message.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{RecipeId, Timestamp};
    use crate::ports::RateLimitScope;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_ingredients_list_every_violation() {
        let err = IngredientListError {
            violations: vec![
                IngredientViolation::TooFew { min: 3, actual: 2 },
                IngredientViolation::Duplicate {
                    value: "basil".to_string(),
                },
            ],
        };

        let response = ApiError::InvalidIngredients(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["violations"].as_array().unwrap().len(), 2);
        assert_eq!(body["violations"][1]["kind"], "duplicate");
    }

    #[tokio::test]
    async fn upstream_error_hides_provider_detail() {
        let response =
            ApiError::Upstream(AIError::unavailable("upstream 529 overloaded_error")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().contains("529"));
    }

    #[tokio::test]
    async fn internal_error_is_generic() {
        let response = ApiError::Internal("lock poisoned".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["error"].as_str().unwrap().contains("lock"));
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let response = ApiError::from(RecipeStoreError::NotFound(RecipeId::new())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let denied = RateLimitDenied {
            limit: 5,
            retry_after_secs: 10,
            reset_at: Timestamp::now(),
            scope: RateLimitScope::User,
            message: "slow down".to_string(),
        };
        let response = ApiError::from(GenerateRecipeError::RateLimited(denied)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
