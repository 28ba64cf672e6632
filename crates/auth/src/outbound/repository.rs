use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::entity::identity::{ContactField, Identity, NewIdentity, Provider};

/// Persistence interface for identities. The store itself is an external
/// collaborator; the only contract relied on is that a single-document write
/// is atomic.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait IdentityRepository: Send + Sync {
    /// Finds an identity by its stable id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Identity))` if a matching identity exists.
    /// * `Ok(None)` if no identity matches (including malformed ids).
    /// * `Err(AppError)` on a store failure.
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AppError>;

    /// Finds the identity linked to a provider account, the lookup every
    /// login performs.
    ///
    /// # Arguments
    ///
    /// * `provider` - Which provider issued the account id.
    /// * `account_id` - The provider's own identifier for the user.
    async fn find_by_provider_account(&self, provider: Provider, account_id: &str)
        -> Result<Option<Identity>, AppError>;

    /// Creates a fresh identity for a first-time login and returns it with
    /// its newly assigned id.
    async fn create(&self, new_identity: NewIdentity) -> Result<Identity, AppError>;

    /// Overwrites exactly one contact field on the identity, leaving every
    /// other field untouched.
    ///
    /// # Returns
    ///
    /// * `Err(AppError::NotFound)` if the identity no longer exists.
    async fn set_contact_field(&self, id: &str, field: ContactField, value: &str) -> Result<(), AppError>;
}
