//! In-memory TTL cache shielding the database from repeated reads.
//!
//! Entries expire lazily on access and are reclaimed by a periodic sweep
//! (spawned in [`crate::startup`]); a hard size bound evicts the
//! soonest-expiring entry before inserting at capacity. Every mutation bumps
//! a per-key version drawn from a global counter, which lets detached
//! background refreshes detect that their target entry was invalidated or
//! replaced while they were in flight and discard their result instead of
//! clobbering newer state.
//!
//! The cache is constructed explicitly and shared through
//! [`crate::model::app::AppState`]; the mutex guarding the map is never held
//! across an await point.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use serde_json::Value;

use crate::config::CacheSettings;

/// How long version bookkeeping outlives its entry before the sweep may
/// prune it. Must exceed the longest possible refresh (all retry attempts
/// against the store deadline plus backoff), so a refresh whose placeholder
/// merely expired still finds its version and applies.
const VERSION_RETENTION: Duration = Duration::from_secs(60);

struct CacheEntry {
    value: Value,
    expires_at: Instant,
    last_access: Instant,
}

struct VersionSlot {
    value: u64,
    touched: Instant,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Last version assigned to each key. Versions come from a global
    /// monotonic counter and are never reused, so a pruned key that is
    /// re-inserted can never collide with a stale in-flight refresh.
    versions: HashMap<String, VersionSlot>,
    next_version: u64,
}

/// Key-value cache with per-entry expiry and a bounded entry count.
pub struct TtlCache {
    inner: Mutex<Inner>,
    default_ttl: Duration,
    max_entries: usize,
}

impl TtlCache {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                versions: HashMap::new(),
                next_version: 0,
            }),
            default_ttl: settings.default_ttl,
            max_entries: settings.max_entries,
        }
    }

    /// Cache key for a user's aggregate favorites view.
    pub fn favorites_key(user_id: i32) -> String {
        format!("favorites:{user_id}")
    }

    /// Cache key for a single favorite item.
    pub fn favorite_key(user_id: i32, kind: &str, item_id: &str) -> String {
        format!("favorite:{user_id}:{kind}:{item_id}")
    }

    /// Prefix covering all of a user's per-item favorite keys.
    pub fn favorite_prefix(user_id: i32) -> String {
        format!("favorite:{user_id}:")
    }

    /// Cache key for a user profile.
    pub fn user_key(user_id: i32) -> String {
        format!("user:{user_id}")
    }

    /// Stores a value under the default TTL.
    pub fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value with `expires_at = now + ttl`.
    ///
    /// At capacity the entry with the soonest `expires_at` is evicted first,
    /// so the cache never rests above `max_entries`. Always succeeds.
    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.lock();

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_entries {
            Self::evict_soonest_expiry(&mut inner);
        }

        Self::bump_version(&mut inner, key);
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_access: now,
            },
        );
    }

    /// Stores a value only if the key's version still matches `expected`.
    ///
    /// Used by background refresh tasks: the version is captured when the
    /// refresh is triggered, and a completion that lost a race with an
    /// invalidation or a newer write is dropped. Returns whether the value
    /// was applied.
    pub fn set_if_version(&self, key: &str, value: Value, ttl: Duration, expected: u64) -> bool {
        let now = Instant::now();
        let mut inner = self.lock();

        if inner.versions.get(key).map_or(0, |slot| slot.value) != expected {
            return false;
        }

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_entries {
            Self::evict_soonest_expiry(&mut inner);
        }

        Self::bump_version(&mut inner, key);
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_access: now,
            },
        );
        true
    }

    /// Current version of a key; 0 for a key never written.
    pub fn version(&self, key: &str) -> u64 {
        self.lock().versions.get(key).map_or(0, |slot| slot.value)
    }

    /// Returns the live value for a key, or `None` if missing or expired.
    ///
    /// An expired entry is deleted on the spot (lazy expiry). A hit
    /// refreshes `last_access` but does not extend `expires_at`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut inner = self.lock();

        let expired = match inner.entries.get_mut(key) {
            Some(entry) if now > entry.expires_at => true,
            Some(entry) => {
                entry.last_access = now;
                return Some(entry.value.clone());
            }
            None => return None,
        };

        if expired {
            inner.entries.remove(key);
        }
        None
    }

    /// Whether a live entry exists for the key.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Time until the key expires; `None` if missing or already expired.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let inner = self.lock();

        inner
            .entries
            .get(key)
            .and_then(|entry| entry.expires_at.checked_duration_since(now))
    }

    /// Explicitly invalidates a key, bumping its version so an in-flight
    /// refresh targeting it is discarded.
    pub fn delete(&self, key: &str) {
        let mut inner = self.lock();
        inner.entries.remove(key);
        // Bump even when the entry already expired away, so a refresh that
        // was triggered against the old entry still sees the invalidation.
        Self::bump_version(&mut inner, key);
    }

    /// Invalidates every key starting with `prefix`; O(n) over the bounded
    /// entry count. Returns the number of entries removed.
    pub fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut inner = self.lock();

        let matched: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matched {
            inner.entries.remove(key);
            Self::bump_version(&mut inner, key);
        }

        matched.len()
    }

    /// Drops all entries and version bookkeeping.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.versions.clear();
    }

    /// Number of physically present entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes expired entries and enforces the size bound.
    ///
    /// Redundant with lazy expiry; exists to reclaim memory from keys that
    /// are never re-read. Version bookkeeping for absent keys is pruned too,
    /// but only after [`VERSION_RETENTION`]: an entry merely expiring is not
    /// an invalidation, so a refresh racing against the sweep must still
    /// find its captured version and apply. Returns the number of entries
    /// removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| now > entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = expired.len();
        for key in expired {
            inner.entries.remove(&key);
        }

        while inner.entries.len() > self.max_entries {
            if !Self::evict_soonest_expiry(&mut inner) {
                break;
            }
            removed += 1;
        }

        let Inner {
            entries, versions, ..
        } = &mut *inner;
        versions.retain(|key, slot| {
            entries.contains_key(key) || now.duration_since(slot.touched) < VERSION_RETENTION
        });

        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex only happens if a panic occurred mid-mutation;
        // the map holds plain owned data, so continuing is sound.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump_version(inner: &mut Inner, key: &str) {
        inner.next_version += 1;
        let slot = VersionSlot {
            value: inner.next_version,
            touched: Instant::now(),
        };
        inner.versions.insert(key.to_string(), slot);
    }

    fn evict_soonest_expiry(inner: &mut Inner) -> bool {
        // Soonest expiry first, least recently accessed as the tie-break
        let victim = inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.expires_at, entry.last_access))
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                inner.entries.remove(&key);
                Self::bump_version(inner, &key);
                true
            }
            None => false,
        }
    }
}
