use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::ProviderAccounts;
use crate::domain::inout::profile::GetProfileOutput;

// ╔════════════════════════════╗
// ║        Get Profile         ║
// ╚════════════════════════════╝

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: String,
    pub provider_accounts: ProviderAccounts,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GetProfileOutput> for ProfileResponse {
    fn from(output: GetProfileOutput) -> Self {
        Self {
            id: output.id,
            display_name: output.display_name,
            provider_accounts: output.provider_accounts,
            email: output.email,
            phone: output.phone,
            location: output.location,
            profile_image_url: output.profile_image_url,
            created_at: output.created_at.to_rfc3339(),
            updated_at: output.updated_at.to_rfc3339(),
        }
    }
}

// ╔════════════════════════════╗
// ║    Contact Field Forms     ║
// ╚════════════════════════════╝

#[derive(Debug, Deserialize)]
pub struct AddEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPhoneRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLocationRequest {
    pub location: String,
}
