//! A small wrapper for successful JSON responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Response<T> {
    message: String,
    data: T,
}

impl<T> Response<T> {
    pub fn with_message(data: T, message: &str) -> Self {
        Self { message: message.to_string(), data }
    }
}

impl<T> From<T> for Response<T> {
    fn from(data: T) -> Self {
        Self { message: "Successfully".to_string(), data }
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_response_from() {
        let resp: Response<&str> = Response::from("abc");
        assert_eq!(resp.message, "Successfully");
        assert_eq!(resp.data, "abc");
    }

    #[tokio::test]
    async fn test_response_into_response() {
        let http_resp = Response::with_message("abc", "Hello!").into_response();

        assert_eq!(http_resp.status(), StatusCode::OK);

        let bytes = to_bytes(http_resp.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["message"], json!("Hello!"));
        assert_eq!(value["data"], json!("abc"));
    }
}
