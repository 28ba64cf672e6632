use std::sync::Arc;

use tower_cookies::Key;

use crate::usecase::authn::AuthnUseCase;
use crate::usecase::profile::ProfileUseCase;

#[derive(Clone)]
pub struct AuthState {
    pub cookie_key: Key,
    pub authn: Arc<dyn AuthnUseCase>,
    pub profile: Arc<dyn ProfileUseCase>,
}

impl AuthState {
    pub fn new(cookie_key: Key, authn: Arc<dyn AuthnUseCase>, profile: Arc<dyn ProfileUseCase>) -> Self {
        Self { cookie_key, authn, profile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::authn::MockAuthnUseCase;
    use crate::usecase::profile::MockProfileUseCase;

    #[test]
    fn test_auth_state_new() {
        let cookie_key = Key::generate();
        let authn: Arc<dyn AuthnUseCase> = Arc::new(MockAuthnUseCase::new());
        let profile: Arc<dyn ProfileUseCase> = Arc::new(MockProfileUseCase::new());

        let state = AuthState::new(cookie_key.clone(), authn.clone(), profile.clone());

        assert!(Arc::ptr_eq(&state.authn, &authn));
        assert!(Arc::ptr_eq(&state.profile, &profile));
        assert_eq!(state.cookie_key.master(), cookie_key.master());
    }
}
