use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::inbound::http::authn::*;
use crate::inbound::http::pages::*;
use crate::inbound::http::profile::*;
use crate::inbound::middleware::{require_authenticated, require_guest, resolve_identity};
use crate::inbound::state::AuthState;

pub fn create_router(state: AuthState) -> Router {
    let guest_routes = Router::new()
        .route("/", get(home))
        .route_layer(middleware::from_fn(require_guest));

    let public_routes = Router::new()
        .route("/about", get(about))
        .route("/auth/{provider}", get(oauth_login))
        .route("/auth/{provider}/callback", get(oauth_callback))
        .route("/logout", get(logout));

    let protected_routes = Router::new()
        .route("/profile", get(get_profile))
        .route("/addEmail", post(add_email))
        .route("/addPhone", post(add_phone))
        .route("/addLocation", post(add_location))
        .route_layer(middleware::from_fn(require_authenticated));

    Router::new()
        .merge(guest_routes)
        .merge(public_routes)
        .merge(protected_routes)
        // Session resolution runs before any guard or handler.
        .layer(middleware::from_fn_with_state(state.clone(), resolve_identity))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;
    use tower_cookies::{CookieManagerLayer, Key};

    use super::*;
    use crate::domain::entity::identity::{Identity, Provider, ProviderAccounts};
    use crate::domain::inout::prelude::*;
    use crate::usecase::authn::MockAuthnUseCase;
    use crate::usecase::profile::MockProfileUseCase;

    fn identity_fixture() -> Identity {
        Identity {
            id: "identity-1".to_string(),
            provider_accounts: ProviderAccounts::linked(Provider::Google, "g123".to_string()),
            display_name: "Ada Lovelace".to_string(),
            email: None,
            phone: None,
            location: None,
            profile_image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile_output() -> GetProfileOutput {
        let identity = identity_fixture();
        GetProfileOutput {
            id: identity.id,
            display_name: identity.display_name,
            provider_accounts: identity.provider_accounts,
            email: identity.email,
            phone: identity.phone,
            location: identity.location,
            profile_image_url: identity.profile_image_url,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }

    fn test_app(authn: MockAuthnUseCase, profile: MockProfileUseCase, key: &Key) -> Router {
        let state = AuthState::new(key.clone(), Arc::new(authn), Arc::new(profile));
        create_router(state).layer(CookieManagerLayer::new())
    }

    /// name=value pairs from every Set-Cookie header on a response, minus
    /// attributes, minus removals (empty values).
    fn cookies_from(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{name}={value}"))
            .collect()
    }

    fn get_request(uri: &str, cookies: &[String]) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location_of(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_full_login_profile_logout_cycle() {
        let key = Key::generate();

        let mut authn = MockAuthnUseCase::new();
        authn
            .expect_oauth_login()
            .withf(|input| input.provider == "google")
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(OAuthLoginOutput {
                        auth_url: "https://accounts.google.com/o/oauth2/v2/auth?state=csrf-1".to_string(),
                        csrf_token: "csrf-1".to_string(),
                        pkce_verifier: "pkce-1".to_string(),
                    })
                })
            });
        authn
            .expect_oauth_callback()
            .withf(|input| input.provider == "google" && input.code == "code-1" && input.pkce_verifier == "pkce-1")
            .times(1)
            .returning(|_| Box::pin(async { Ok(OAuthCallbackOutput { session_token: "sess-1".to_string() }) }));
        // Steps 3 and 4 see a live session, step 5 runs after logout.
        authn
            .expect_resolve_identity()
            .withf(|token| token == "sess-1")
            .times(2)
            .returning(|_| Box::pin(async { Ok(Some(identity_fixture())) }));
        authn
            .expect_logout()
            .withf(|input| input.session_token.as_deref() == Some("sess-1"))
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));
        authn
            .expect_resolve_identity()
            .withf(|token| token == "sess-1")
            .times(1)
            .returning(|_| Box::pin(async { Ok(None) }));

        let mut profile = MockProfileUseCase::new();
        profile
            .expect_get_profile()
            .withf(|input| input.identity_id == "identity-1")
            .times(1)
            .returning(|_| Box::pin(async { Ok(profile_output()) }));

        let app = test_app(authn, profile, &key);

        // 1. Kick off the handshake.
        let response = app.clone().oneshot(get_request("/auth/google", &[])).await.unwrap();
        assert!(response.status().is_redirection());
        assert!(location_of(&response).starts_with("https://accounts.google.com/"));
        let state_cookies = cookies_from(&response);
        assert_eq!(state_cookies.len(), 1);

        // 2. Provider calls back; the session cookie gets set.
        let response = app
            .clone()
            .oneshot(get_request("/auth/google/callback?code=code-1&state=csrf-1", &state_cookies))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/profile");
        let session_cookies: Vec<String> = cookies_from(&response)
            .into_iter()
            .filter(|pair| pair.starts_with("__session="))
            .collect();
        assert_eq!(session_cookies.len(), 1);

        // 3. The profile renders for the signed-in user.
        let response = app.clone().oneshot(get_request("/profile", &session_cookies)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["display_name"], "Ada Lovelace");
        assert_eq!(json["data"]["provider_accounts"]["google"], "g123");

        // 4. Logout terminates the session and clears the cookie.
        let response = app.clone().oneshot(get_request("/logout", &session_cookies)).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");

        // 5. The old cookie no longer resolves; /profile bounces home.
        let response = app.clone().oneshot(get_request("/profile", &session_cookies)).await.unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");
    }

    #[tokio::test]
    async fn test_callback_without_code_redirects_home() {
        let key = Key::generate();
        let app = test_app(MockAuthnUseCase::new(), MockProfileUseCase::new(), &key);

        let response = app
            .oneshot(get_request("/auth/google/callback?state=whatever", &[]))
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");
    }

    #[tokio::test]
    async fn test_callback_with_provider_error_redirects_home() {
        let key = Key::generate();
        let app = test_app(MockAuthnUseCase::new(), MockProfileUseCase::new(), &key);

        let response = app
            .oneshot(get_request("/auth/google/callback?error=access_denied", &[]))
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let key = Key::generate();
        let app = test_app(MockAuthnUseCase::new(), MockProfileUseCase::new(), &key);

        let response = app.oneshot(get_request("/profile", &[])).await.unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");
    }

    #[tokio::test]
    async fn test_home_is_open_to_guests() {
        let key = Key::generate();
        let app = test_app(MockAuthnUseCase::new(), MockProfileUseCase::new(), &key);

        let response = app.oneshot(get_request("/", &[])).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_without_session_still_redirects_home() {
        let key = Key::generate();

        let mut authn = MockAuthnUseCase::new();
        authn
            .expect_logout()
            .withf(|input| input.session_token.is_none())
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let app = test_app(authn, MockProfileUseCase::new(), &key);
        let response = app.oneshot(get_request("/logout", &[])).await.unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location_of(&response), "/");
    }
}
