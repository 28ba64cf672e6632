use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

// The rendering layer proper lives elsewhere; these return the view data.

pub async fn home() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Storyline. Sign in at /auth/google, /auth/facebook, or /auth/instagram."
    }))
}

pub async fn about() -> impl IntoResponse {
    Json(json!({
        "message": "Storyline is a small social app: sign in with an account you already have, keep a profile, share stories."
    }))
}
