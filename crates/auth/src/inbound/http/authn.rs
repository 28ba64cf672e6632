use app_core::error::AppError;
use app_core::extractors::{AppPath, AppQuery};
use app_core::oauth::OAuthError;
use axum::debug_handler;
use axum::extract::State;
use axum::response::Redirect;
use serde_json::json;
use tower_cookies::cookie::{time, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::domain::inout::prelude::*;
use crate::inbound::middleware::SESSION_COOKIE;
use crate::inbound::model::prelude::*;
use crate::inbound::state::AuthState;

// The CSRF token and PKCE verifier ride between the redirect and the
// callback in an encrypted, short-lived cookie.
const OAUTH_STATE_COOKIE: &str = "__oauth_state";
const KEY_OAUTH_STATE_CSRF: &str = "csrf_token";
const KEY_OAUTH_STATE_PKCE: &str = "pkce_verifier";

#[debug_handler]
pub async fn oauth_login(
    State(state): State<AuthState>,
    cookies: Cookies,
    AppPath(provider): AppPath<String>,
) -> Result<Redirect, AppError> {
    let output = state.authn.oauth_login(OAuthLoginInput { provider }).await?;

    let value = json!({
        KEY_OAUTH_STATE_CSRF: output.csrf_token,
        KEY_OAUTH_STATE_PKCE: output.pkce_verifier,
    })
    .to_string();

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(time::Duration::minutes(5))
        .same_site(SameSite::Lax)
        .build();
    cookies.private(&state.cookie_key).add(cookie);

    Ok(Redirect::to(&output.auth_url))
}

#[debug_handler]
pub async fn oauth_callback(
    State(state): State<AuthState>,
    cookies: Cookies,
    AppPath(provider): AppPath<String>,
    AppQuery(query): AppQuery<OAuthCallbackRequest>,
) -> Result<Redirect, AppError> {
    if let Some(error) = query.error {
        return Err(OAuthError::Denied(error).into());
    }

    let code = query.code.ok_or(OAuthError::InvalidCallback("missing authorization code"))?;

    let private = cookies.private(&state.cookie_key);
    let state_cookie = private
        .get(OAUTH_STATE_COOKIE)
        .ok_or(OAuthError::InvalidCallback("state cookie missing or expired"))?;

    // One shot only, success or not.
    let mut used = Cookie::new(OAUTH_STATE_COOKIE, "");
    used.set_path("/");
    private.remove(used);

    let stored: serde_json::Value = serde_json::from_str(state_cookie.value())
        .map_err(|_| OAuthError::InvalidCallback("state cookie is malformed"))?;

    let csrf_token = stored[KEY_OAUTH_STATE_CSRF]
        .as_str()
        .ok_or(OAuthError::InvalidCallback("state cookie is malformed"))?;
    if query.state.as_deref() != Some(csrf_token) {
        return Err(OAuthError::InvalidCallback("state token mismatch").into());
    }

    let pkce_verifier = stored[KEY_OAUTH_STATE_PKCE]
        .as_str()
        .ok_or(OAuthError::InvalidCallback("state cookie is malformed"))?
        .to_string();

    let output = state
        .authn
        .oauth_callback(OAuthCallbackInput { provider, code, pkce_verifier })
        .await?;

    let session_cookie = Cookie::build((SESSION_COOKIE, output.session_token))
        .http_only(true)
        .secure(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    cookies.signed(&state.cookie_key).add(session_cookie);

    Ok(Redirect::to("/profile"))
}

#[debug_handler]
pub async fn logout(State(state): State<AuthState>, cookies: Cookies) -> Result<Redirect, AppError> {
    let signed = cookies.signed(&state.cookie_key);
    let session_token = signed.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());

    state.authn.logout(LogoutInput { session_token }).await?;

    let mut dead = Cookie::new(SESSION_COOKIE, "");
    dead.set_path("/");
    signed.remove(dead);

    Ok(Redirect::to("/"))
}
