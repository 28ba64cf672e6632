use std::sync::Arc;

use app_core::config::Config;
use app_core::error::AppError;
use app_core::oauth::{OAuthRegistry, ProviderProfile};
use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::identity::{Identity, NewIdentity, Provider};
use crate::domain::entity::oauth::CanonicalProfile;
use crate::domain::inout::prelude::*;
use crate::outbound::repository::IdentityRepository;
use crate::outbound::session::SessionRepository;

const SESSION_TTL_KEY: &str = "session.ttl_secs";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuthnUseCase: Send + Sync {
    /// Starts the provider handshake: the redirect URL plus the state the
    /// callback will need to verify.
    async fn oauth_login(&self, input: OAuthLoginInput) -> Result<OAuthLoginOutput, AppError>;

    /// Completes the handshake and establishes a session for the resulting
    /// identity.
    async fn oauth_callback(&self, input: OAuthCallbackInput) -> Result<OAuthCallbackOutput, AppError>;

    /// Terminates the session, if there is one. Idempotent.
    async fn logout(&self, input: LogoutInput) -> Result<(), AppError>;

    /// Resolves a session token to the identity it authenticates. `None` is
    /// the normal unauthenticated outcome, never an error.
    async fn resolve_identity(&self, session_token: &str) -> Result<Option<Identity>, AppError>;
}

pub struct AuthnService {
    config: Arc<Config>,
    oauth: OAuthRegistry,
    session: Arc<dyn SessionRepository>,
    repo: Arc<dyn IdentityRepository>,
}

impl AuthnService {
    pub fn new(
        config: Arc<Config>,
        oauth: OAuthRegistry,
        session: Arc<dyn SessionRepository>,
        repo: Arc<dyn IdentityRepository>,
    ) -> Self {
        Self { config, oauth, session, repo }
    }

    /// Settles the provider's raw profile into the canonical shape. The
    /// display name falls back to the email, then to the account id, so an
    /// identity always has one.
    fn canonicalize(profile: ProviderProfile) -> Result<CanonicalProfile, AppError> {
        let provider = Provider::from_name(&profile.provider).ok_or(AppError::Internal)?;

        let display_name = profile
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| profile.email.clone())
            .unwrap_or_else(|| profile.provider_account_id.clone());

        Ok(CanonicalProfile {
            provider,
            provider_account_id: profile.provider_account_id,
            display_name,
            email: profile.email,
            profile_image_url: profile.profile_image_url,
        })
    }

    /// Bridges a canonical profile to a durable identity and a live session.
    async fn establish_session(&self, profile: CanonicalProfile) -> Result<(Identity, String), AppError> {
        let identity = match self
            .repo
            .find_by_provider_account(profile.provider, &profile.provider_account_id)
            .await?
        {
            // A re-login reuses the identity untouched; whatever the provider
            // sent this time never overwrites user-edited fields.
            Some(existing) => existing,
            None => {
                let created = self
                    .repo
                    .create(NewIdentity {
                        provider: profile.provider,
                        provider_account_id: profile.provider_account_id.clone(),
                        display_name: profile.display_name.clone(),
                        email: profile.email.clone(),
                        profile_image_url: profile.profile_image_url.clone(),
                    })
                    .await?;
                tracing::info!(
                    identity_id = %created.id,
                    provider = %profile.provider,
                    "Created identity on first login"
                );
                created
            },
        };

        let token = Uuid::new_v4().simple().to_string();
        let ttl_secs = self.config.get::<u64>(SESSION_TTL_KEY)?;
        self.session.create(&token, &identity.id, ttl_secs).await?;

        Ok((identity, token))
    }
}

#[async_trait]
impl AuthnUseCase for AuthnService {
    async fn oauth_login(&self, input: OAuthLoginInput) -> Result<OAuthLoginOutput, AppError> {
        input.validate()?;

        let adapter = self.oauth.get(&input.provider)?;
        let request = adapter.authorization_request();

        Ok(OAuthLoginOutput {
            auth_url: request.url,
            csrf_token: request.csrf_token,
            pkce_verifier: request.pkce_verifier,
        })
    }

    async fn oauth_callback(&self, input: OAuthCallbackInput) -> Result<OAuthCallbackOutput, AppError> {
        input.validate()?;

        let adapter = self.oauth.get(&input.provider)?;

        let access_token = adapter.exchange_code(input.code, input.pkce_verifier).await?;
        let raw_profile = adapter.fetch_profile(&access_token).await?;
        let profile = Self::canonicalize(raw_profile)?;

        let (identity, session_token) = self.establish_session(profile).await?;
        tracing::info!(identity_id = %identity.id, "Session established");

        Ok(OAuthCallbackOutput { session_token })
    }

    async fn logout(&self, input: LogoutInput) -> Result<(), AppError> {
        if let Some(token) = input.session_token {
            self.session.delete(&token).await?;
        }

        Ok(())
    }

    async fn resolve_identity(&self, session_token: &str) -> Result<Option<Identity>, AppError> {
        let Some(identity_id) = self.session.find_identity_id(session_token).await? else {
            return Ok(None);
        };

        match self.repo.find_by_id(&identity_id).await? {
            Some(identity) => Ok(Some(identity)),
            None => {
                // The session outlived its identity; drop it so the cookie
                // stops resolving.
                tracing::warn!(identity_id, "Session bound to a missing identity, terminating it");
                self.session.delete(session_token).await?;
                Ok(None)
            },
        }
    }
}
