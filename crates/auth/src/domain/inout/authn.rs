use validator::Validate;

// ╔════════════════════════════╗
// ║        Login OAuth         ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct OAuthLoginInput {
    #[validate(length(min = 1, message = "provider cannot be empty"))]
    pub provider: String,
}

#[derive(Debug)]
pub struct OAuthLoginOutput {
    pub auth_url: String,
    pub csrf_token: String,
    pub pkce_verifier: String,
}

// ╔════════════════════════════╗
// ║   Login OAuth Callback     ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct OAuthCallbackInput {
    #[validate(length(min = 1, message = "provider cannot be empty"))]
    pub provider: String,

    #[validate(length(min = 1, message = "code cannot be empty"))]
    pub code: String,

    pub pkce_verifier: String,
}

/// The freshly minted session token, ready to be bound into the cookie.
#[derive(Debug)]
pub struct OAuthCallbackOutput {
    pub session_token: String,
}

// ╔════════════════════════════╗
// ║          Logout            ║
// ╚════════════════════════════╝

/// `session_token` is whatever the session cookie held, if anything;
/// terminating an absent or already-dead session is a no-op.
#[derive(Debug)]
pub struct LogoutInput {
    pub session_token: Option<String>,
}
