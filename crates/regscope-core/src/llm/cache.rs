//! Completion caching to avoid re-asking the model identical prompts

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: SystemTime,
}

/// Entry bound used by [`ResponseCache::with_ttl`]
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// In-memory TTL cache keyed by model and prompt hash
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Cache holding at most `max_entries`; expired entries are swept when
    /// the bound is reached, then the entry closest to expiry is evicted
    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// A zero TTL turns the cache into a no-op
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Get cached value if present and not expired
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn set(&self, key: String, value: String) {
        if !self.is_enabled() {
            return;
        }
        let entry = CacheEntry {
            value,
            expires_at: SystemTime::now() + self.ttl,
        };
        if let Ok(mut entries) = self.entries.write() {
            if !entries.contains_key(&key) && entries.len() >= self.max_entries {
                let now = SystemTime::now();
                entries.retain(|_, entry| now < entry.expires_at);
                if entries.len() >= self.max_entries {
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, entry)| entry.expires_at)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        entries.remove(&oldest);
                    }
                }
            }
            entries.insert(key, entry);
        }
    }

    /// Drop expired entries
    pub fn cleanup(&self) {
        if let Ok(mut entries) = self.entries.write() {
            let now = SystemTime::now();
            entries.retain(|_, entry| now < entry.expires_at);
        }
    }

    pub fn stats(&self) -> CacheStats {
        if let Ok(entries) = self.entries.read() {
            let now = SystemTime::now();
            let total = entries.len();
            let expired = entries.values().filter(|e| now >= e.expires_at).count();

            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Cache key for a chat completion: model plus a hash of the serialized messages
pub fn chat_cache_key(model: &str, messages: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    messages.hash(&mut hasher);
    format!("chat:{}:{:x}", model, hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let cache = ResponseCache::with_ttl(Duration::from_secs(60));

        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiry_and_cleanup() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(50));

        cache.set("key1".to_string(), "value1".to_string());
        cache.set("key2".to_string(), "value2".to_string());
        assert_eq!(cache.stats().active_entries, 2);

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.stats().expired_entries, 2);

        cache.cleanup();
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_full_cache_sweeps_expired_on_insert() {
        let cache = ResponseCache::with_capacity(Duration::from_millis(50), 2);

        cache.set("key1".to_string(), "value1".to_string());
        cache.set("key2".to_string(), "value2".to_string());
        std::thread::sleep(Duration::from_millis(80));

        cache.set("key3".to_string(), "value3".to_string());
        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 0);
        assert_eq!(cache.get("key3"), Some("value3".to_string()));
    }

    #[test]
    fn test_full_cache_stays_bounded() {
        let cache = ResponseCache::with_capacity(Duration::from_secs(60), 2);

        for i in 0..10 {
            cache.set(format!("key{}", i), format!("value{}", i));
        }
        assert_eq!(cache.stats().total_entries, 2);
        assert_eq!(cache.get("key9"), Some("value9".to_string()));

        cache.set("key9".to_string(), "updated".to_string());
        assert_eq!(cache.stats().total_entries, 2);
        assert_eq!(cache.get("key9"), Some("updated".to_string()));
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = ResponseCache::with_ttl(Duration::ZERO);
        cache.set("key".to_string(), "value".to_string());
        assert_eq!(cache.get("key"), None);
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_cache_key_generation() {
        let key1 = chat_cache_key("model1", "[prompt]");
        let key2 = chat_cache_key("model1", "[prompt]");
        let key3 = chat_cache_key("model2", "[prompt]");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert!(key1.starts_with("chat:model1:"));
    }
}
