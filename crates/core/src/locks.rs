//! Striped async locks keyed by string.
//!
//! Serializes read-modify-write cycles on the same logical record (a post
//! aggregate, a pair of users) within this process. Distinct keys may share
//! a stripe; that only costs contention, never correctness.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tokio::sync::{Mutex, MutexGuard};

const DEFAULT_STRIPES: usize = 64;

/// A fixed set of mutexes addressed by key hash.
#[derive(Clone)]
pub struct KeyedLocks {
    stripes: Arc<[Mutex<()>]>,
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyedLocks {
    /// Create a lock set with the default stripe count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stripes(DEFAULT_STRIPES)
    }

    /// Create a lock set with `stripes` mutexes (at least one).
    #[must_use]
    pub fn with_stripes(stripes: usize) -> Self {
        let stripes: Vec<Mutex<()>> = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self {
            stripes: stripes.into(),
        }
    }

    /// Wait for the stripe owning `key`.
    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.index(key)].lock().await
    }

    fn index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }
}

/// Order-independent key for an unordered pair of ids.
#[must_use]
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}
