//! The application-wide error type and its HTTP mapping.
//!
//! Handshake and guard failures resolve into a redirect to the home page;
//! persistence failures surface as a generic server error with the detail
//! kept in the logs. No internal error reaches a client verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use bb8_redis::bb8;
use bb8_redis::redis::RedisError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::config::ConfigError;
use super::oauth::OAuthError;

/// Where a failed or unauthenticated auth flow lands the user.
pub const FAILURE_REDIRECT: &str = "/";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication flow failed")]
    AuthFlow(#[from] OAuthError),

    #[error("Config operation failed")]
    Config(#[from] ConfigError),

    #[error("Database operation failed")]
    Database(#[from] mongodb::error::Error),

    #[error("Redis operation failed")]
    Redis(#[from] RedisError),

    #[error("Redis connection pool operation failed")]
    RedisPool(#[from] bb8::RunError<RedisError>),

    #[error("Serde JSON operation failed")]
    JsonParse(#[from] serde_json::Error),

    #[error("An internal server error occurred")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn generic_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { message: "An internal server error occurred".to_string(), details: None }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RequestFormat(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { message: msg, details: None }),
            )
                .into_response(),

            AppError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    message: "Validation failed".to_string(),
                    details: Some(json!(err.field_errors())),
                }),
            )
                .into_response(),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse { message: msg, details: None }),
            )
                .into_response(),

            // Unauthenticated access and broken handshakes both land on the
            // home page; the reason stays server-side.
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized request: {msg}");
                Redirect::to(FAILURE_REDIRECT).into_response()
            },
            AppError::AuthFlow(err) => {
                tracing::warn!("Authentication flow failed: {err:?}");
                Redirect::to(FAILURE_REDIRECT).into_response()
            },

            AppError::Config(err) => {
                tracing::error!("Config error: {err:?}");
                generic_server_error()
            },
            AppError::Database(err) => {
                tracing::error!("Database error: {err:?}");
                generic_server_error()
            },
            AppError::Redis(err) => {
                tracing::error!("Redis error: {err:?}");
                generic_server_error()
            },
            AppError::RedisPool(bb8::RunError::User(err)) => {
                tracing::error!("Redis error: {err:?}");
                generic_server_error()
            },
            AppError::RedisPool(bb8::RunError::TimedOut) => {
                tracing::error!("Redis connection pool timed out");
                generic_server_error()
            },
            AppError::JsonParse(err) => {
                tracing::error!("Failed to process JSON: {err:?}");
                generic_server_error()
            },
            AppError::Internal => generic_server_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header;
    use serde_json::Value;

    use super::*;

    async fn extract_json(response: Response<Body>) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let json: Value = serde_json::from_slice(&bytes).expect("Failed to parse JSON response");
        (status, json)
    }

    #[tokio::test]
    async fn test_request_format_error() {
        let response = AppError::RequestFormat("Invalid form data".to_string()).into_response();
        let (status, json) = extract_json(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid form data");
        assert!(json["details"].is_null());
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let response = AppError::NotFound("Identity not found".to_string()).into_response();
        let (status, json) = extract_json(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Identity not found");
    }

    #[tokio::test]
    async fn test_unauthorized_redirects_home() {
        let response = AppError::Unauthorized("no session".to_string()).into_response();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), FAILURE_REDIRECT);
    }

    #[tokio::test]
    async fn test_auth_flow_redirects_home() {
        let err = AppError::AuthFlow(OAuthError::CodeExchange("provider said no".to_string()));
        let response = err.into_response();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), FAILURE_REDIRECT);
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response = AppError::Internal.into_response();
        let (status, json) = extract_json(response).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_pool_timeout_is_generic() {
        let response = AppError::RedisPool(bb8::RunError::TimedOut).into_response();
        let (status, json) = extract_json(response).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "An internal server error occurred");
    }
}
