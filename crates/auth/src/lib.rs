mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;

use app_core::config::Config;
use app_core::oauth::OAuthRegistry;
use bb8_redis::bb8::Pool;
use bb8_redis::RedisConnectionManager;
pub use inbound::router::create_router;
pub use inbound::state::AuthState;
use mongodb::Database;
use tower_cookies::Key;

use crate::outbound::mongo::IdentityMongo;
use crate::outbound::session::SessionRedis;
use crate::usecase::authn::AuthnService;
use crate::usecase::profile::ProfileService;

pub struct Dependency {
    pub db: Database,
    pub rds: Pool<RedisConnectionManager>,
    pub config: Arc<Config>,
    pub oauth: OAuthRegistry,
    pub cookie_key: Key,
}

pub fn new(dep: Dependency) -> AuthState {
    let session = Arc::new(SessionRedis::new(dep.rds));
    let repo = Arc::new(IdentityMongo::new(&dep.db));

    let authn_svc = Arc::new(AuthnService::new(dep.config, dep.oauth, session, repo.clone()));
    let profile_svc = Arc::new(ProfileService::new(repo));

    AuthState::new(dep.cookie_key, authn_svc, profile_svc)
}
