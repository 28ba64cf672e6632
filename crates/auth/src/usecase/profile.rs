use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::inout::prelude::*;
use crate::outbound::repository::IdentityRepository;

const IDENTITY_NOT_FOUND_MSG: &str = "Identity not found";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProfileUseCase: Send + Sync {
    async fn get_profile(&self, input: GetProfileInput) -> Result<GetProfileOutput, AppError>;

    /// Sets one contact field on the caller's own identity. The id always
    /// comes from the resolved session, never from the request, so there is
    /// no path to another user's record.
    async fn update_contact(&self, input: UpdateContactInput) -> Result<UpdateContactOutput, AppError>;
}

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn IdentityRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn IdentityRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProfileUseCase for ProfileService {
    async fn get_profile(&self, input: GetProfileInput) -> Result<GetProfileOutput, AppError> {
        let identity = self
            .repo
            .find_by_id(&input.identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(IDENTITY_NOT_FOUND_MSG.to_string()))?;

        Ok(GetProfileOutput {
            id: identity.id,
            display_name: identity.display_name,
            provider_accounts: identity.provider_accounts,
            email: identity.email,
            phone: identity.phone,
            location: identity.location,
            profile_image_url: identity.profile_image_url,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        })
    }

    async fn update_contact(&self, input: UpdateContactInput) -> Result<UpdateContactOutput, AppError> {
        self.repo
            .set_contact_field(&input.identity_id, input.field, &input.value)
            .await?;

        tracing::info!(identity_id = %input.identity_id, field = %input.field, "Contact field updated");

        Ok(UpdateContactOutput { success: true })
    }
}
