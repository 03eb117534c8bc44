//! Recipient Cache
//!
//! Process-wide TTL cache keyed by normalized handle. Scoped to the
//! signed-in user; `clear` runs on sign-out so a later user never sees a
//! previous user's resolved contacts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::resolver::ResolvedRecipient;

/// A cached resolution with its expiry
#[derive(Debug, Clone)]
struct CacheSlot {
    recipient: ResolvedRecipient,
    expires_at: Instant,
}

/// TTL cache over resolved recipients.
///
/// Thread-safe; clones share the same underlying map.
#[derive(Clone)]
pub struct RecipientCache {
    slots: Arc<RwLock<HashMap<String, CacheSlot>>>,
    ttl: Duration,
}

impl RecipientCache {
    /// Create a cache with the given entry TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Get a live entry; expired entries are dropped on access
    pub async fn get(&self, handle: &str) -> Option<ResolvedRecipient> {
        {
            let slots = self.slots.read().await;
            match slots.get(handle) {
                Some(slot) if slot.expires_at > Instant::now() => {
                    return Some(slot.recipient.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: take the write lock and evict
        self.slots.write().await.remove(handle);
        None
    }

    /// Insert or refresh an entry with a fresh TTL
    pub async fn insert(&self, handle: &str, recipient: ResolvedRecipient) {
        let slot = CacheSlot {
            recipient,
            expires_at: Instant::now() + self.ttl,
        };
        self.slots.write().await.insert(handle.to_string(), slot);
    }

    /// Drop a single entry (cache-bust after a profile edit)
    pub async fn invalidate(&self, handle: &str) {
        self.slots.write().await.remove(handle);
    }

    /// Drop everything; called on sign-out
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }

    /// Number of entries, live or not yet evicted
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::resolver::RecipientKind;

    fn recipient(id: &str) -> ResolvedRecipient {
        ResolvedRecipient {
            id: id.to_string(),
            handle: Some("alice".to_string()),
            display_name: Some("Alice".to_string()),
            avatar_url: None,
            verified: false,
            kind: RecipientKind::Account,
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = RecipientCache::new(Duration::from_secs(60));
        cache.insert("alice", recipient("u_1")).await;

        let hit = cache.get("alice").await.unwrap();
        assert_eq!(hit.id, "u_1");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expiry_evicts() {
        let cache = RecipientCache::new(Duration::from_millis(10));
        cache.insert("alice", recipient("u_1")).await;

        tokio::time::sleep(Duration::from_millis(25)).await;

        assert!(cache.get("alice").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_and_invalidate() {
        let cache = RecipientCache::new(Duration::from_secs(60));
        cache.insert("alice", recipient("u_1")).await;
        cache.insert("bob", recipient("u_2")).await;

        cache.invalidate("alice").await;
        assert!(cache.get("alice").await.is_none());
        assert!(cache.get("bob").await.is_some());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_refreshes_ttl() {
        let cache = RecipientCache::new(Duration::from_millis(40));
        cache.insert("alice", recipient("u_1")).await;
        tokio::time::sleep(Duration::from_millis(25)).await;

        cache.insert("alice", recipient("u_1")).await;
        tokio::time::sleep(Duration::from_millis(25)).await;

        // 50ms after first insert, but only 25ms after the refresh
        assert!(cache.get("alice").await.is_some());
    }
}
