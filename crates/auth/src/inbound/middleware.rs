//! Per-request identity resolution and the route access guards.
//!
//! Resolution happens once, up front: the session cookie (if any) is looked
//! up and the outcome is attached to the request as [`ResolvedIdentity`].
//! There is no process-wide "current user" anywhere. Guards are pure
//! predicates over that attachment, applied per route group.

use app_core::error::AppError;
use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::{Cookie, Cookies};

use crate::domain::entity::identity::Identity;
use crate::inbound::state::AuthState;

pub const SESSION_COOKIE: &str = "__session";

/// The outcome of session resolution, attached to every request.
#[derive(Clone)]
pub struct ResolvedIdentity(pub Option<Identity>);

/// Extractor for handlers on authenticated routes.
#[derive(Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .and_then(|resolved| resolved.0.clone())
            .map(CurrentIdentity)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Resolves the inbound session cookie to an identity and attaches the
/// result. Runs before any guard or handler.
pub async fn resolve_identity(
    State(state): State<AuthState>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let signed = cookies.signed(&state.cookie_key);

    let resolved = match signed.get(SESSION_COOKIE) {
        Some(cookie) => {
            let identity = state.authn.resolve_identity(cookie.value()).await?;
            if identity.is_none() {
                // Stale or forged cookie: take it off the client.
                let mut dead = Cookie::new(SESSION_COOKIE, "");
                dead.set_path("/");
                signed.remove(dead);
            }
            identity
        },
        None => None,
    };

    req.extensions_mut().insert(ResolvedIdentity(resolved));

    Ok(next.run(req).await)
}

/// How a route relates to authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Only for authenticated users.
    Protected,
    /// Only makes sense for visitors who are not signed in.
    GuestOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Continue,
    Redirect(&'static str),
}

/// The whole access-control policy, as a pure function.
pub fn evaluate_access(class: RouteClass, authenticated: bool) -> AccessDecision {
    match (class, authenticated) {
        (RouteClass::Protected, false) => AccessDecision::Redirect("/"),
        (RouteClass::GuestOnly, true) => AccessDecision::Redirect("/profile"),
        _ => AccessDecision::Continue,
    }
}

async fn guard(class: RouteClass, req: Request<Body>, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<ResolvedIdentity>()
        .map(|resolved| resolved.0.is_some())
        .unwrap_or(false);

    match evaluate_access(class, authenticated) {
        AccessDecision::Continue => next.run(req).await,
        AccessDecision::Redirect(target) => Redirect::to(target).into_response(),
    }
}

pub async fn require_authenticated(req: Request<Body>, next: Next) -> Response {
    guard(RouteClass::Protected, req, next).await
}

pub async fn require_guest(req: Request<Body>, next: Next) -> Response {
    guard(RouteClass::GuestOnly, req, next).await
}
