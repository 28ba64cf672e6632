use serde::Deserialize;

// ╔════════════════════════════╗
// ║     OAuth Callback         ║
// ╚════════════════════════════╝

/// What a provider may send back to the callback URL. Everything is optional
/// because a denial carries only `error`.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackRequest {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
