use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use super::domain::FormData;
use super::scoring::OverallResult;

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_CAPACITY: usize = 256;

/// Lifetime and size limits for cached engine results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// A zero TTL or zero capacity turns caching off.
    pub fn is_disabled(&self) -> bool {
        self.ttl_seconds == 0 || self.capacity == 0
    }
}

/// Hex-encoded SHA-256 of the canonical JSON form of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDigest(String);

impl FormDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest identical forms to the same key. Map ordering makes the JSON canonical.
pub fn form_digest(form: &FormData) -> FormDigest {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(form) {
        Ok(bytes) => hasher.update(&bytes),
        // FormData only holds maps, strings, numbers and booleans; keep a stable key regardless.
        Err(error) => hasher.update(error.to_string().as_bytes()),
    }
    let digest = hasher.finalize();
    FormDigest(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}

struct CacheEntry {
    result: OverallResult,
    inserted_at: DateTime<Utc>,
}

/// Explicit TTL cache in front of the pure scoring engine.
pub struct ScoreCache {
    config: CacheConfig,
    entries: HashMap<FormDigest, CacheEntry>,
}

impl ScoreCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: &FormDigest, now: DateTime<Utc>) -> Option<OverallResult> {
        let expired = match self.entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => {
                trace!(digest = %key, "score cache hit");
                return Some(entry.result.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            trace!(digest = %key, "score cache entry expired");
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&mut self, key: FormDigest, result: OverallResult, now: DateTime<Utc>) {
        if self.config.is_disabled() {
            return;
        }

        self.purge_expired(now);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.capacity {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: now,
            },
        );
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl();
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.inserted_at) < ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) >= self.ttl()
    }

    fn ttl(&self) -> Duration {
        let seconds = i64::try_from(self.config.ttl_seconds).unwrap_or(i64::MAX / 1_000);
        Duration::try_seconds(seconds).unwrap_or(Duration::MAX)
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
