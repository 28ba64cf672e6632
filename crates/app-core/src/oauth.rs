//! OAuth 2.0 authorization-code flow (with PKCE) against the supported
//! identity providers.
//!
//! Provider differences are confined to a [`ProviderSpec`]: endpoint URLs,
//! the requested scope set, and how the raw profile response maps into the
//! provider-independent [`ProviderProfile`]. There is exactly one client
//! implementation; adding a provider means adding a `ProviderSpec` entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use reqwest::{redirect, Client, ClientBuilder};
use serde_json::Value;
use thiserror::Error;

// Upper bound on every provider round-trip; a hung provider must never hang
// the request.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Authorization code exchange failed: {0}")]
    CodeExchange(String),

    #[error("Provider denied the authorization request: {0}")]
    Denied(String),

    #[error("Callback state is missing or invalid: {0}")]
    InvalidCallback(&'static str),

    #[error("Provider profile response is missing field `{0}`")]
    ProfileField(&'static str),

    #[error("Provider not configured: {0}")]
    ProviderNotFound(String),
}

/// The provider-independent shape extracted from a provider's profile
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: String,
    pub provider_account_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Everything that may vary between providers.
pub struct ProviderSpec {
    pub name: &'static str,
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub profile_url: &'static str,
    pub scopes: &'static [&'static str],
    pub map_profile: fn(&Value) -> Result<ProviderProfile, OAuthError>,
}

pub static GOOGLE: ProviderSpec = ProviderSpec {
    name: "google",
    auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    profile_url: "https://www.googleapis.com/oauth2/v3/userinfo",
    scopes: &["profile", "email"],
    map_profile: map_google,
};

pub static FACEBOOK: ProviderSpec = ProviderSpec {
    name: "facebook",
    auth_url: "https://www.facebook.com/v19.0/dialog/oauth",
    token_url: "https://graph.facebook.com/v19.0/oauth/access_token",
    profile_url: "https://graph.facebook.com/v19.0/me?fields=id,name,email,picture.type(large)",
    scopes: &["email"],
    map_profile: map_facebook,
};

pub static INSTAGRAM: ProviderSpec = ProviderSpec {
    name: "instagram",
    auth_url: "https://api.instagram.com/oauth/authorize",
    token_url: "https://api.instagram.com/oauth/access_token",
    profile_url: "https://graph.instagram.com/me?fields=id,username",
    scopes: &[],
    map_profile: map_instagram,
};

pub fn builtin_specs() -> [&'static ProviderSpec; 3] {
    [&GOOGLE, &FACEBOOK, &INSTAGRAM]
}

fn required_str(raw: &Value, field: &'static str) -> Result<String, OAuthError> {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(OAuthError::ProfileField(field))
}

fn optional_str(raw: &Value, field: &str) -> Option<String> {
    raw.get(field).and_then(Value::as_str).map(str::to_owned)
}

fn map_google(raw: &Value) -> Result<ProviderProfile, OAuthError> {
    Ok(ProviderProfile {
        provider: GOOGLE.name.to_string(),
        provider_account_id: required_str(raw, "sub")?,
        display_name: optional_str(raw, "name"),
        email: optional_str(raw, "email"),
        profile_image_url: optional_str(raw, "picture"),
    })
}

fn map_facebook(raw: &Value) -> Result<ProviderProfile, OAuthError> {
    Ok(ProviderProfile {
        provider: FACEBOOK.name.to_string(),
        provider_account_id: required_str(raw, "id")?,
        display_name: optional_str(raw, "name"),
        email: optional_str(raw, "email"),
        // Graph nests the image under picture.data.url.
        profile_image_url: raw
            .pointer("/picture/data/url")
            .and_then(Value::as_str)
            .map(str::to_owned),
    })
}

fn map_instagram(raw: &Value) -> Result<ProviderProfile, OAuthError> {
    Ok(ProviderProfile {
        provider: INSTAGRAM.name.to_string(),
        provider_account_id: required_str(raw, "id")?,
        display_name: optional_str(raw, "username"),
        email: None,
        profile_image_url: None,
    })
}

/// The state a caller must hold between the redirect and the callback.
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_token: String,
    pub pkce_verifier: String,
}

#[async_trait::async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait OAuthAdapter: Send + Sync {
    /// Builds the provider authorization URL plus the CSRF token and PKCE
    /// verifier the callback will need.
    fn authorization_request(&self) -> AuthorizationRequest;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: String, pkce_verifier: String) -> Result<String, OAuthError>;

    /// Fetches and normalizes the user's profile from the provider.
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
}

/// The single adapter implementation, parameterized by a [`ProviderSpec`].
pub struct StandardOAuthClient {
    spec: &'static ProviderSpec,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    http: Client,
}

impl StandardOAuthClient {
    pub fn new(
        spec: &'static ProviderSpec,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Result<Self, OAuthError> {
        let http = ClientBuilder::new()
            .timeout(PROVIDER_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            spec,
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new(spec.auth_url.to_string())?,
            token_url: TokenUrl::new(spec.token_url.to_string())?,
            redirect_url: RedirectUrl::new(redirect_uri)?,
            http,
        })
    }
}

#[async_trait::async_trait]
impl OAuthAdapter for StandardOAuthClient {
    fn authorization_request(&self) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.spec.scopes.iter().map(|s| Scope::new((*s).to_string())))
            .set_pkce_challenge(pkce_challenge)
            .url();

        tracing::debug!(provider = self.spec.name, "Built authorization URL");

        AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_token: csrf_token.secret().to_string(),
            pkce_verifier: pkce_verifier.secret().to_string(),
        }
    }

    async fn exchange_code(&self, code: String, pkce_verifier: String) -> Result<String, OAuthError> {
        let token = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                let reason = match &e {
                    oauth2::RequestTokenError::ServerResponse(err) => {
                        format!("provider rejected the code: {:?}", err.error_description())
                    },
                    _ => format!("{e:?}"),
                };
                tracing::warn!(provider = self.spec.name, "Code exchange failed: {reason}");
                OAuthError::CodeExchange(reason)
            })?;

        Ok(token.access_token().secret().to_string())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let raw: Value = self
            .http
            .get(self.spec.profile_url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        (self.spec.map_profile)(&raw)
    }
}

/// Configured adapters keyed by provider name. Routing code looks providers
/// up here and never branches on a provider itself.
#[derive(Clone, Default)]
pub struct OAuthRegistry {
    adapters: HashMap<String, Arc<dyn OAuthAdapter>>,
}

impl OAuthRegistry {
    pub fn new() -> Self {
        Self { adapters: HashMap::new() }
    }

    pub fn register(&mut self, name: &str, adapter: Arc<dyn OAuthAdapter>) {
        self.adapters.insert(name.to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn OAuthAdapter>, OAuthError> {
        self.adapters
            .get(name)
            .ok_or_else(|| OAuthError::ProviderNotFound(name.to_string()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }
}
