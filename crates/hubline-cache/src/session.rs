//! Memoised session resolution using moka.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use hubline_core::config::SessionConfig;
use hubline_core::result::AppResult;
use hubline_core::traits::SessionResolver;
use hubline_core::types::UserId;

/// Session resolver decorator that memoises successful lookups.
///
/// Only positive results are cached, so a session created right after a
/// failed handshake is picked up on the next attempt.
#[derive(Clone)]
pub struct SessionCache {
    /// Token → user.
    cache: Cache<String, UserId>,
    /// The resolver consulted on a miss.
    inner: Arc<dyn SessionResolver>,
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl SessionCache {
    /// Wraps `inner` with a cache sized and timed from configuration.
    pub fn new(inner: Arc<dyn SessionResolver>, config: &SessionConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_max_entries)
            .time_to_live(config.cache_ttl())
            .build();
        Self { cache, inner }
    }
}

#[async_trait]
impl SessionResolver for SessionCache {
    async fn resolve(&self, token: &str) -> AppResult<Option<UserId>> {
        if let Some(user_id) = self.cache.get(token).await {
            return Ok(Some(user_id));
        }

        let resolved = self.inner.resolve(token).await?;
        if let Some(user_id) = resolved {
            self.cache.insert(token.to_string(), user_id).await;
            debug!(user_id = %user_id, "Session resolved and cached");
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MapResolver {
        sessions: Mutex<HashMap<String, UserId>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionResolver for MapResolver {
        async fn resolve(&self, token: &str) -> AppResult<Option<UserId>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sessions.lock().unwrap().get(token).copied())
        }
    }

    #[tokio::test]
    async fn test_hit_skips_inner() {
        let inner = Arc::new(MapResolver::default());
        inner
            .sessions
            .lock()
            .unwrap()
            .insert("abc".to_string(), UserId(4));
        let cache = SessionCache::new(inner.clone(), &SessionConfig::default());

        assert_eq!(cache.resolve("abc").await.unwrap(), Some(UserId(4)));
        assert_eq!(cache.resolve("abc").await.unwrap(), Some(UserId(4)));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let inner = Arc::new(MapResolver::default());
        let cache = SessionCache::new(inner.clone(), &SessionConfig::default());

        assert_eq!(cache.resolve("late").await.unwrap(), None);
        inner
            .sessions
            .lock()
            .unwrap()
            .insert("late".to_string(), UserId(9));
        assert_eq!(cache.resolve("late").await.unwrap(), Some(UserId(9)));
    }
}
