//! Cache policy for the session list and chat history.
//!
//! Reads go through the cache: a hit is served without touching the store, a
//! miss loads from the store and repopulates the entry (only when the result
//! is non-empty). Writes are applied to the store first by the caller and then
//! patched into whichever entries are already cached, preserving their
//! remaining TTL. Entries that are not cached stay uncached.
//!
//! Every cache operation is best-effort. Failures are logged and swallowed;
//! a failed patch deletes the affected key so the next read goes to the
//! store. A patch is never retried.
//!
//! A patch keeps the entry's existing expiry rather than starting a new one.
//! Patches issued through one `ChatCache` are serialized, so concurrent
//! appends cannot overwrite each other's cached list. Several server
//! processes sharing one Redis are not coordinated: a lost update there
//! leaves the entry stale until it expires, while the store stays correct.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tripchat_core::types::DbId;
use tripchat_db::models::chat_message::{AppendedMessage, MessageEntry};
use tripchat_db::models::chat_session::SessionSummary;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::keys::{session_messages_key, sessions_list_key};
use crate::store::CacheStore;

/// What a patch closure wants done with the cached list it was given.
enum Patch {
    /// Write the modified list back.
    Write,
    /// The cached list cannot be reconciled; delete the key.
    Invalidate,
}

/// Outcome of one patch attempt, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchOutcome {
    NotCached,
    Updated,
    Invalidated,
}

/// Read-through / write-through cache for one user's sessions and messages.
#[derive(Clone)]
pub struct ChatCache {
    store: Arc<dyn CacheStore>,
    config: CacheConfig,
    /// Held for the whole read-modify-write of a patch.
    patch_lock: Arc<Mutex<()>>,
}

impl ChatCache {
    pub fn new(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            patch_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Whether the backend currently answers.
    pub async fn is_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The user's sessions, most recently active first.
    ///
    /// `load` is only invoked on a cache miss.
    pub async fn sessions<F, Fut, E>(&self, user_id: DbId, load: F) -> Result<Vec<SessionSummary>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<SessionSummary>, E>>,
    {
        let key = sessions_list_key(user_id);
        self.read_through(&key, self.config.sessions_ttl(), load)
            .await
    }

    /// The messages of one session in chronological order.
    ///
    /// `load` is only invoked on a cache miss.
    pub async fn messages<F, Fut, E>(
        &self,
        user_id: DbId,
        session_id: &str,
        load: F,
    ) -> Result<Vec<MessageEntry>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<MessageEntry>, E>>,
    {
        let key = session_messages_key(user_id, session_id);
        self.read_through(&key, self.config.messages_ttl(), load)
            .await
    }

    // -----------------------------------------------------------------------
    // Write-through
    // -----------------------------------------------------------------------

    /// Reflect a newly created session in the cached session list.
    pub async fn record_session(&self, user_id: DbId, session: &SessionSummary) {
        let key = sessions_list_key(user_id);
        self.patch::<SessionSummary, _>(&key, self.config.sessions_ttl(), |list| {
            list.retain(|s| s.session_id != session.session_id);
            list.insert(0, session.clone());
            Patch::Write
        })
        .await;
    }

    /// Reflect an appended message in the cached history and session list.
    ///
    /// The message is appended to the cached history of its session, and the
    /// session is moved to the front of the cached list with its new activity
    /// timestamp. A session missing from the cached list invalidates it,
    /// unless the append itself created that session.
    pub async fn record_message(&self, user_id: DbId, appended: &AppendedMessage) {
        let session_id = appended.message.session_id.as_str();

        let messages_key = session_messages_key(user_id, session_id);
        let entry = MessageEntry::from(&appended.message);
        self.patch::<MessageEntry, _>(&messages_key, self.config.messages_ttl(), |list| {
            list.push(entry);
            Patch::Write
        })
        .await;

        let summary = SessionSummary::from(&appended.session);
        if appended.session_created {
            self.record_session(user_id, &summary).await;
            return;
        }

        let sessions_key = sessions_list_key(user_id);
        self.patch::<SessionSummary, _>(&sessions_key, self.config.sessions_ttl(), |list| {
            match list.iter().position(|s| s.session_id == summary.session_id) {
                Some(index) => {
                    let mut bumped = list.remove(index);
                    bumped.last_activity_timestamp = summary.last_activity_timestamp;
                    list.insert(0, bumped);
                    Patch::Write
                }
                None => Patch::Invalidate,
            }
        })
        .await;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn read_through<T, F, Fut, E>(&self, key: &str, ttl: Duration, load: F) -> Result<Vec<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(hit) = self.lookup::<T>(key).await {
            tracing::debug!(key, count = hit.len(), "Cache hit");
            return Ok(hit);
        }

        tracing::debug!(key, "Cache miss");
        let rows = load().await?;
        if !rows.is_empty() {
            self.populate(key, &rows, ttl).await;
        }
        Ok(rows)
    }

    /// Fetch and decode a cached list. Backend errors count as a miss; an
    /// undecodable entry is deleted.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                self.invalidate(key).await;
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, rows: &[T], ttl: Duration) {
        let result = match serde_json::to_string(rows) {
            Ok(payload) => self.store.set_ex(key, &payload, ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Cache populate failed");
        }
    }

    /// Apply `apply` to a cached list if one exists, deleting the key on any
    /// failure.
    async fn patch<T, P>(&self, key: &str, default_ttl: Duration, apply: P)
    where
        T: Serialize + DeserializeOwned,
        P: FnOnce(&mut Vec<T>) -> Patch,
    {
        let _guard = self.patch_lock.lock().await;
        match self.try_patch(key, default_ttl, apply).await {
            Ok(PatchOutcome::NotCached) => {
                tracing::trace!(key, "Cache entry absent, leaving uncached");
            }
            Ok(PatchOutcome::Updated) => {
                tracing::debug!(key, "Cache entry updated");
            }
            Ok(PatchOutcome::Invalidated) => {
                tracing::debug!(key, "Cache entry inconsistent, invalidating");
                self.invalidate(key).await;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache update failed, invalidating");
                self.invalidate(key).await;
            }
        }
    }

    async fn try_patch<T, P>(
        &self,
        key: &str,
        default_ttl: Duration,
        apply: P,
    ) -> Result<PatchOutcome, CacheError>
    where
        T: Serialize + DeserializeOwned,
        P: FnOnce(&mut Vec<T>) -> Patch,
    {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(PatchOutcome::NotCached);
        };

        let mut list: Vec<T> = serde_json::from_str(&raw)?;
        if let Patch::Invalidate = apply(&mut list) {
            return Ok(PatchOutcome::Invalidated);
        }

        let payload = serde_json::to_string(&list)?;
        if !self.store.replace(key, &payload).await? {
            // Expired since it was read.
            return Ok(PatchOutcome::NotCached);
        }
        if self.store.ttl(key).await?.is_none() {
            self.store.set_ex(key, &payload, default_ttl).await?;
        }
        Ok(PatchOutcome::Updated)
    }

    async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.del(key).await {
            tracing::error!(key, error = %e, "Cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tripchat_core::types::Timestamp;
    use tripchat_db::models::chat_message::ChatMessage;
    use tripchat_db::models::chat_session::ChatSession;

    use super::*;
    use crate::memory::MemoryCache;

    const USER: DbId = 1;

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn summary(id: &str, secs: i64) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            session_name: format!("Trip {id}"),
            last_activity_timestamp: at(secs),
        }
    }

    fn entry(content: &str, secs: i64) -> MessageEntry {
        MessageEntry {
            role: "user".to_string(),
            content: content.to_string(),
            sent_at: at(secs),
        }
    }

    fn appended(session_id: &str, content: &str, secs: i64, created: bool) -> AppendedMessage {
        AppendedMessage {
            message: ChatMessage {
                id: secs,
                user_id: USER,
                session_id: session_id.to_string(),
                role: "user".to_string(),
                content: content.to_string(),
                sent_at: at(secs),
            },
            session: ChatSession {
                id: 1,
                user_id: USER,
                session_id: session_id.to_string(),
                session_name: format!("Trip {session_id}"),
                last_activity_timestamp: at(secs),
                created_at: at(0),
            },
            session_created: created,
        }
    }

    fn cache_over(store: Arc<dyn CacheStore>) -> ChatCache {
        ChatCache::new(
            store,
            CacheConfig {
                redis_url: None,
                sessions_ttl_secs: 600,
                messages_ttl_secs: 900,
            },
        )
    }

    fn memory_cache() -> (Arc<MemoryCache>, ChatCache) {
        let store = Arc::new(MemoryCache::new());
        let cache = cache_over(store.clone());
        (store, cache)
    }

    /// Loader that counts how often the store was consulted.
    async fn load_counted<T: Clone>(
        calls: &AtomicUsize,
        rows: &[T],
    ) -> Result<Vec<T>, std::convert::Infallible> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(rows.to_vec())
    }

    async fn cached_sessions(store: &MemoryCache) -> Option<Vec<SessionSummary>> {
        store
            .get(&sessions_list_key(USER))
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    async fn cached_messages(store: &MemoryCache, session_id: &str) -> Option<Vec<MessageEntry>> {
        store
            .get(&session_messages_key(USER, session_id))
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// Backend whose writes (or reads) can be made to fail.
    struct FlakyStore {
        inner: MemoryCache,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryCache::new(),
                fail_writes: AtomicBool::new(false),
                fail_reads: AtomicBool::new(false),
            }
        }

        fn injected() -> CacheError {
            CacheError::from(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "injected failure",
            )))
        }
    }

    #[async_trait]
    impl CacheStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(Self::injected());
            }
            self.inner.get(key).await
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::injected());
            }
            self.inner.set_ex(key, value, ttl).await
        }

        async fn replace(&self, key: &str, value: &str) -> Result<bool, CacheError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::injected());
            }
            self.inner.replace(key, value).await
        }

        async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
            self.inner.ttl(key).await
        }

        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.inner.del(key).await
        }

        async fn ping(&self) -> Result<(), CacheError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(Self::injected());
            }
            Ok(())
        }
    }

    /// Backend that yields to the scheduler after every read, so concurrent
    /// patches interleave between their read and their write.
    struct YieldingStore {
        inner: MemoryCache,
    }

    #[async_trait]
    impl CacheStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            let value = self.inner.get(key).await;
            tokio::task::yield_now().await;
            value
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            self.inner.set_ex(key, value, ttl).await
        }

        async fn replace(&self, key: &str, value: &str) -> Result<bool, CacheError> {
            self.inner.replace(key, value).await
        }

        async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
            self.inner.ttl(key).await
        }

        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.inner.del(key).await
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Read-through
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn miss_loads_from_store_then_hit_skips_it() {
        let (_store, cache) = memory_cache();
        let calls = AtomicUsize::new(0);
        let rows = vec![summary("s2", 20), summary("s1", 10)];

        let first = cache
            .sessions(USER, || load_counted(&calls, &rows))
            .await
            .unwrap();
        let second = cache
            .sessions(USER, || load_counted(&calls, &rows))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, rows);
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn empty_result_is_not_cached() {
        let (store, cache) = memory_cache();
        let calls = AtomicUsize::new(0);
        let rows: Vec<MessageEntry> = Vec::new();

        cache
            .messages(USER, "s1", || load_counted(&calls, &rows))
            .await
            .unwrap();
        cache
            .messages(USER, "s1", || load_counted(&calls, &rows))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn loader_error_is_propagated() {
        let (_store, cache) = memory_cache();
        let result: Result<Vec<SessionSummary>, &str> =
            cache.sessions(USER, || async { Err("store down") }).await;
        assert_eq!(result.unwrap_err(), "store down");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_reloaded_from_store() {
        let (_store, cache) = memory_cache();
        let calls = AtomicUsize::new(0);
        let rows = vec![entry("hi", 1)];

        cache
            .messages(USER, "s1", || load_counted(&calls, &rows))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(899)).await;
        cache
            .messages(USER, "s1", || load_counted(&calls, &rows))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        cache
            .messages(USER, "s1", || load_counted(&calls, &rows))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn undecodable_entry_is_dropped_and_reloaded() {
        let (store, cache) = memory_cache();
        store
            .set_ex(&sessions_list_key(USER), "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let calls = AtomicUsize::new(0);
        let rows = vec![summary("s1", 1)];

        let listed = cache
            .sessions(USER, || load_counted(&calls, &rows))
            .await
            .unwrap();

        assert_eq!(listed, rows);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached_sessions(&store).await, Some(rows));
    }

    #[tokio::test]
    async fn backend_read_failure_falls_back_to_store() {
        let store = Arc::new(FlakyStore::new());
        store.fail_reads.store(true, Ordering::SeqCst);
        let cache = cache_over(store.clone());
        let calls = AtomicUsize::new(0);
        let rows = vec![summary("s1", 1)];

        let listed = cache
            .sessions(USER, || load_counted(&calls, &rows))
            .await
            .unwrap();

        assert_eq!(listed, rows);
        assert!(!cache.is_healthy().await);
    }

    // -----------------------------------------------------------------------
    // Write-through on new message
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn message_appended_to_cached_history() {
        let (store, cache) = memory_cache();
        let rows = vec![entry("first", 1)];
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(rows.clone()) })
            .await
            .unwrap();

        cache
            .record_message(USER, &appended("s1", "second", 2, false))
            .await;

        let cached = cached_messages(&store, "s1").await.unwrap();
        let contents: Vec<_> = cached.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn cache_hit_matches_store_order_after_appends() {
        let (_store, cache) = memory_cache();
        let mut store_rows = vec![entry("m0", 0)];
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(store_rows.clone()) })
            .await
            .unwrap();

        for i in 1..5 {
            let content = format!("m{i}");
            let write = appended("s1", &content, i, false);
            store_rows.push(MessageEntry::from(&write.message));
            cache.record_message(USER, &write).await;
        }

        let hit = cache
            .messages(USER, "s1", || async {
                Err::<Vec<MessageEntry>, _>("store must not be read")
            })
            .await
            .unwrap();
        assert_eq!(hit, store_rows);
        assert!(hit.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
    }

    #[tokio::test]
    async fn uncached_history_stays_uncached() {
        let (store, cache) = memory_cache();

        cache
            .record_message(USER, &appended("s1", "hi", 1, false))
            .await;

        assert!(cached_messages(&store, "s1").await.is_none());
        assert!(cached_sessions(&store).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn patch_preserves_remaining_ttl() {
        let (store, cache) = memory_cache();
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(vec![entry("a", 1)]) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        cache
            .record_message(USER, &appended("s1", "b", 2, false))
            .await;

        let key = session_messages_key(USER, "s1");
        assert_eq!(store.ttl(&key).await.unwrap(), Some(Duration::from_secs(600)));

        tokio::time::advance(Duration::from_secs(600)).await;
        assert!(store.get(&key).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn frequent_appends_do_not_extend_the_entry() {
        let store = Arc::new(MemoryCache::new());
        let cache = ChatCache::new(
            store.clone(),
            CacheConfig {
                redis_url: None,
                sessions_ttl_secs: 10,
                messages_ttl_secs: 10,
            },
        );
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(vec![entry("seed", 0)]) })
            .await
            .unwrap();
        let key = session_messages_key(USER, "s1");

        for i in 1..=40 {
            tokio::time::advance(Duration::from_millis(500)).await;
            cache
                .record_message(USER, &appended("s1", &format!("m{i}"), i, false))
                .await;
            if i == 10 {
                assert_eq!(store.ttl(&key).await.unwrap(), Some(Duration::from_secs(5)));
            }
        }

        assert!(store.get(&key).await.unwrap().is_none());
        assert_eq!(store.ttl(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_bumped_to_front_on_new_message() {
        let (store, cache) = memory_cache();
        let rows = vec![summary("s3", 30), summary("s2", 20), summary("s1", 10)];
        cache
            .sessions(USER, || async { Ok::<_, ()>(rows.clone()) })
            .await
            .unwrap();

        cache
            .record_message(USER, &appended("s1", "hi", 40, false))
            .await;

        let cached = cached_sessions(&store).await.unwrap();
        let ids: Vec<_> = cached.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3", "s2"]);
        assert_eq!(cached[0].last_activity_timestamp, at(40));
        assert_eq!(cached[0].session_name, "Trip s1");
    }

    #[tokio::test]
    async fn unknown_session_invalidates_cached_list() {
        let (store, cache) = memory_cache();
        cache
            .sessions(USER, || async { Ok::<_, ()>(vec![summary("s1", 10)]) })
            .await
            .unwrap();

        cache
            .record_message(USER, &appended("ghost", "hi", 20, false))
            .await;

        assert!(cached_sessions(&store).await.is_none());
    }

    #[tokio::test]
    async fn implicitly_created_session_is_prepended() {
        let (store, cache) = memory_cache();
        cache
            .sessions(USER, || async { Ok::<_, ()>(vec![summary("s1", 10)]) })
            .await
            .unwrap();

        cache
            .record_message(USER, &appended("s2", "hi", 20, true))
            .await;

        let cached = cached_sessions(&store).await.unwrap();
        let ids: Vec<_> = cached.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
    }

    #[tokio::test]
    async fn concurrent_appends_to_different_sessions_stay_separate() {
        let (store, cache) = memory_cache();
        for id in ["a", "b"] {
            cache
                .messages(USER, id, || async { Ok::<_, ()>(vec![entry("seed", 0)]) })
                .await
                .unwrap();
        }

        let writes_a: Vec<_> = (1..=5).map(|i| appended("a", &format!("a{i}"), i, false)).collect();
        let writes_b: Vec<_> = (1..=5).map(|i| appended("b", &format!("b{i}"), i, false)).collect();
        let run_a = async {
            for w in &writes_a {
                cache.record_message(USER, w).await;
            }
        };
        let run_b = async {
            for w in &writes_b {
                cache.record_message(USER, w).await;
            }
        };
        tokio::join!(run_a, run_b);

        let a = cached_messages(&store, "a").await.unwrap();
        let b = cached_messages(&store, "b").await.unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(b.len(), 6);
        assert!(a.iter().skip(1).all(|m| m.content.starts_with('a')));
        assert!(b.iter().skip(1).all(|m| m.content.starts_with('b')));
    }

    #[tokio::test]
    async fn concurrent_appends_to_one_session_are_all_cached() {
        let store = Arc::new(YieldingStore {
            inner: MemoryCache::new(),
        });
        let cache = cache_over(store.clone());
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(vec![entry("seed", 0)]) })
            .await
            .unwrap();

        let first = appended("s1", "first", 1, false);
        let second = appended("s1", "second", 2, false);
        tokio::join!(
            cache.record_message(USER, &first),
            cache.record_message(USER, &second),
        );

        let cached = cached_messages(&store.inner, "s1").await.unwrap();
        let mut contents: Vec<_> = cached.iter().map(|m| m.content.as_str()).collect();
        contents.sort_unstable();
        assert_eq!(contents, vec!["first", "second", "seed"]);
    }

    // -----------------------------------------------------------------------
    // Write-through on new session
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn new_session_prepended_preserving_ttl() {
        let (store, cache) = memory_cache();
        cache
            .sessions(USER, || async { Ok::<_, ()>(vec![summary("s1", 10)]) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(100)).await;

        cache.record_session(USER, &summary("s2", 20)).await;

        let cached = cached_sessions(&store).await.unwrap();
        let ids: Vec<_> = cached.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(
            store.ttl(&sessions_list_key(USER)).await.unwrap(),
            Some(Duration::from_secs(500))
        );
    }

    #[tokio::test]
    async fn new_session_leaves_uncached_list_uncached() {
        let (store, cache) = memory_cache();
        cache.record_session(USER, &summary("s1", 10)).await;
        assert!(cached_sessions(&store).await.is_none());
    }

    // -----------------------------------------------------------------------
    // Fault policy
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failed_update_deletes_the_key() {
        let store = Arc::new(FlakyStore::new());
        let cache = cache_over(store.clone());
        cache
            .messages(USER, "s1", || async { Ok::<_, ()>(vec![entry("a", 1)]) })
            .await
            .unwrap();
        cache
            .sessions(USER, || async { Ok::<_, ()>(vec![summary("s1", 1)]) })
            .await
            .unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        cache
            .record_message(USER, &appended("s1", "b", 2, false))
            .await;

        assert!(store
            .inner
            .get(&session_messages_key(USER, "s1"))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .inner
            .get(&sessions_list_key(USER))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn failed_populate_still_returns_store_rows() {
        let store = Arc::new(FlakyStore::new());
        store.fail_writes.store(true, Ordering::SeqCst);
        let cache = cache_over(store.clone());
        let rows = vec![summary("s1", 1)];

        let listed = cache
            .sessions(USER, || async { Ok::<_, ()>(rows.clone()) })
            .await
            .unwrap();

        assert_eq!(listed, rows);
        assert!(store.inner.is_empty().await);
    }
}
