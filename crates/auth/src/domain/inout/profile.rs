use chrono::{DateTime, Utc};

use crate::domain::entity::identity::{ContactField, ProviderAccounts};

// ╔════════════════════════════╗
// ║        Get Profile         ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct GetProfileInput {
    pub identity_id: String,
}

#[derive(Debug)]
pub struct GetProfileOutput {
    pub id: String,
    pub display_name: String,
    pub provider_accounts: ProviderAccounts,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ╔════════════════════════════╗
// ║     Update Contact Field   ║
// ╚════════════════════════════╝

/// One owner-scoped, single-field update. The value is stored as given; the
/// application deliberately performs no format validation on contact fields.
#[derive(Debug)]
pub struct UpdateContactInput {
    pub identity_id: String,
    pub field: ContactField,
    pub value: String,
}

#[derive(Debug)]
pub struct UpdateContactOutput {
    pub success: bool,
}
