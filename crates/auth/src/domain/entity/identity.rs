use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity providers this application can authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Facebook,
    Instagram,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Facebook, Provider::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Instagram => "instagram",
        }
    }

    /// Parses a provider name as it appears in routes and configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "google" => Some(Provider::Google),
            "facebook" => Some(Provider::Facebook),
            "instagram" => Some(Provider::Instagram),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-provider account ids linked to one identity. Only the provider used
/// for a given login is populated; the others stay empty until a future
/// linking feature fills them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl ProviderAccounts {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Google => self.google.as_deref(),
            Provider::Facebook => self.facebook.as_deref(),
            Provider::Instagram => self.instagram.as_deref(),
        }
    }

    pub fn set(&mut self, provider: Provider, account_id: String) {
        match provider {
            Provider::Google => self.google = Some(account_id),
            Provider::Facebook => self.facebook = Some(account_id),
            Provider::Instagram => self.instagram = Some(account_id),
        }
    }

    pub fn linked(provider: Provider, account_id: String) -> Self {
        let mut accounts = Self::default();
        accounts.set(provider, account_id);
        accounts
    }
}

/// One human user, addressable independently of the provider they signed in
/// with. `id` is assigned at first login and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub provider_accounts: ProviderAccounts,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The data needed to create an identity from a first-time login.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIdentity {
    pub provider: Provider,
    pub provider_account_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

/// The owner-editable contact fields. Each one is set independently and the
/// update touches nothing else on the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Phone,
    Location,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Location => "location",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
