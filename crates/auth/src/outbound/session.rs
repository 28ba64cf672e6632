use app_core::error::AppError;
use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{bb8, RedisConnectionManager};

/// Server-side session state: an opaque token mapped to the id of the
/// identity it authenticates. Expiry is the store's own TTL.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionRepository: Send + Sync {
    /// Binds a token to an identity id with the given time-to-live.
    async fn create(&self, token: &str, identity_id: &str, ttl_secs: u64) -> Result<(), AppError>;

    /// Looks up the identity id a token is bound to.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(identity_id))` for a live session.
    /// * `Ok(None)` for an unknown or expired token, never an error.
    async fn find_identity_id(&self, token: &str) -> Result<Option<String>, AppError>;

    /// Deletes a session. Deleting a token that does not exist is a no-op.
    async fn delete(&self, token: &str) -> Result<(), AppError>;
}

/// Redis-backed implementation of [`SessionRepository`].
pub struct SessionRedis {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl SessionRedis {
    pub fn new(pool: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    fn key(token: &str) -> String {
        format!("session:{token}")
    }
}

#[async_trait]
impl SessionRepository for SessionRedis {
    async fn create(&self, token: &str, identity_id: &str, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(Self::key(token), identity_id, ttl_secs).await?;
        Ok(())
    }

    async fn find_identity_id(&self, token: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.pool.get().await?;
        let identity_id: Option<String> = conn.get(Self::key(token)).await?;
        Ok(identity_id)
    }

    async fn delete(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.del(Self::key(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;

    #[test]
    fn test_session_key_prefix() {
        assert_eq!(SessionRedis::key("abc"), "session:abc");
    }

    #[tokio::test]
    async fn test_create_session() {
        let mut mock = MockSessionRepository::new();
        mock.expect_create()
            .with(eq("token-1"), eq("identity-1"), eq(3600u64))
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        assert!(mock.create("token-1", "identity-1", 3600).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_missing_token_is_none_not_error() {
        let mut mock = MockSessionRepository::new();
        mock.expect_find_identity_id()
            .with(eq("missing"))
            .returning(|_| Box::pin(async { Ok(None) }));

        assert_eq!(mock.find_identity_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let mut mock = MockSessionRepository::new();
        mock.expect_delete()
            .with(eq("token-1"))
            .times(2)
            .returning(|_| Box::pin(async { Ok(()) }));

        assert!(mock.delete("token-1").await.is_ok());
        assert!(mock.delete("token-1").await.is_ok());
    }
}
