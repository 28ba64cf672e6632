use super::identity::Provider;

/// The provider-independent profile produced by a completed handshake, after
/// the provider name has been resolved and a display name settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProfile {
    pub provider: Provider,
    pub provider_account_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}
