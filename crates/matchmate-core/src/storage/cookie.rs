use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl Cookie {
    /// Create a cookie that expires `max_age` from now.
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires_at: Utc::now() + max_age,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Key/value store with cookie semantics.
///
/// Operations never fail from the caller's point of view. Implementations
/// log persistence problems and carry on.
pub trait CookieJar: Send + Sync {
    /// Return the named cookie unless it is missing or expired.
    fn get(&self, name: &str) -> Option<Cookie>;

    /// Insert or replace a cookie.
    fn set(&self, cookie: Cookie);

    /// Remove a cookie. Removing a missing cookie is a no-op.
    fn remove(&self, name: &str);

    /// Insert or replace several cookies as one update.
    fn set_all(&self, cookies: Vec<Cookie>) {
        for cookie in cookies {
            self.set(cookie);
        }
    }

    /// Remove several cookies as one update.
    fn remove_all(&self, names: &[&str]) {
        for name in names {
            self.remove(name);
        }
    }
}

/// Lock a jar's map, recovering from poisoning.
pub(crate) fn lock_entries(
    entries: &Mutex<HashMap<String, Cookie>>,
) -> MutexGuard<'_, HashMap<String, Cookie>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    entries: Mutex<HashMap<String, Cookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock_entries(&self.entries)
            .values()
            .filter(|c| !c.is_expired())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<Cookie> {
        let mut entries = lock_entries(&self.entries);
        let cookie = entries.get(name)?.clone();
        if cookie.is_expired() {
            entries.remove(name);
            return None;
        }
        Some(cookie)
    }

    fn set(&self, cookie: Cookie) {
        lock_entries(&self.entries).insert(cookie.name.clone(), cookie);
    }

    fn remove(&self, name: &str) {
        lock_entries(&self.entries).remove(name);
    }
}
