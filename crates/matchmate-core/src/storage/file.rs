use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::cookie::{lock_entries, Cookie, CookieJar};

/// Cookie file name in the cache directory
pub const COOKIE_FILE: &str = "cookies.json";

/// Cookie jar persisted as a JSON map next to the other cached state.
///
/// The whole jar is rewritten on every mutation; it holds a handful of entries.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    entries: Mutex<HashMap<String, Cookie>>,
}

impl FileCookieJar {
    /// Open the jar at `<dir>/cookies.json`, loading any unexpired entries.
    ///
    /// A missing file yields an empty jar. An unreadable or corrupt file is
    /// logged and also yields an empty jar.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(COOKIE_FILE);
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Discarding unreadable cookie file");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), count = entries.len(), "Cookie jar opened");

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<HashMap<String, Cookie>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read cookie file")?;
        let mut entries: HashMap<String, Cookie> =
            serde_json::from_str(&contents).context("Failed to parse cookie file")?;
        entries.retain(|_, cookie| !cookie.is_expired());
        Ok(entries)
    }

    fn save(&self, entries: &HashMap<String, Cookie>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn persist(&self, entries: &HashMap<String, Cookie>) {
        if let Err(e) = self.save(entries) {
            warn!(error = %e, path = %self.path.display(), "Failed to save cookie file");
        }
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Option<Cookie> {
        let mut entries = lock_entries(&self.entries);
        let cookie = entries.get(name)?.clone();
        if cookie.is_expired() {
            entries.remove(name);
            self.persist(&entries);
            return None;
        }
        Some(cookie)
    }

    fn set(&self, cookie: Cookie) {
        let mut entries = lock_entries(&self.entries);
        entries.insert(cookie.name.clone(), cookie);
        self.persist(&entries);
    }

    fn remove(&self, name: &str) {
        let mut entries = lock_entries(&self.entries);
        if entries.remove(name).is_some() {
            self.persist(&entries);
        }
    }

    /// Single file rewrite, so a crash cannot leave half a session on disk.
    fn set_all(&self, cookies: Vec<Cookie>) {
        let mut entries = lock_entries(&self.entries);
        for cookie in cookies {
            entries.insert(cookie.name.clone(), cookie);
        }
        self.persist(&entries);
    }

    fn remove_all(&self, names: &[&str]) {
        let mut entries = lock_entries(&self.entries);
        let before = entries.len();
        for name in names {
            entries.remove(*name);
        }
        if entries.len() != before {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_cookies_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let jar = FileCookieJar::open(dir.path());
        jar.set(Cookie::new("access_token", "tok1", Duration::days(1)));
        drop(jar);

        let reopened = FileCookieJar::open(dir.path());
        assert_eq!(reopened.get("access_token").unwrap().value, "tok1");
    }

    #[test]
    fn test_remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();

        let jar = FileCookieJar::open(dir.path());
        jar.set(Cookie::new("a", "1", Duration::days(1)));
        jar.remove("a");

        let reopened = FileCookieJar::open(dir.path());
        assert!(reopened.get("a").is_none());
    }

    #[test]
    fn test_expired_entries_dropped_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut stale = Cookie::new("old", "x", Duration::days(1));
        stale.expires_at = Utc::now() - Duration::minutes(5);
        let mut entries = HashMap::new();
        entries.insert(stale.name.clone(), stale);
        std::fs::write(
            dir.path().join(COOKIE_FILE),
            serde_json::to_string(&entries).unwrap(),
        )
        .unwrap();

        let jar = FileCookieJar::open(dir.path());
        assert!(jar.get("old").is_none());
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(COOKIE_FILE), "{not json").unwrap();

        let jar = FileCookieJar::open(dir.path());
        assert!(jar.get("anything").is_none());

        jar.set(Cookie::new("a", "1", Duration::days(1)));
        assert_eq!(FileCookieJar::open(dir.path()).get("a").unwrap().value, "1");
    }

    #[test]
    fn test_set_all_persists_every_cookie() {
        let dir = tempfile::tempdir().unwrap();

        let jar = FileCookieJar::open(dir.path());
        jar.set_all(vec![
            Cookie::new("a", "1", Duration::days(1)),
            Cookie::new("b", "2", Duration::days(30)),
        ]);
        jar.remove_all(&["a"]);

        let reopened = FileCookieJar::open(dir.path());
        assert!(reopened.get("a").is_none());
        assert_eq!(reopened.get("b").unwrap().value, "2");
    }

    #[test]
    fn test_credential_store_survives_reopen() {
        use crate::auth::CredentialStore;
        use crate::models::{CurrentUser, MemberStatus, Role};
        use std::sync::Arc;

        let user = CurrentUser::new("42", Role::Member, MemberStatus::Active);

        for (auto_login, days) in [(false, 1), (true, 30)] {
            let dir = tempfile::tempdir().unwrap();
            CredentialStore::new(Arc::new(FileCookieJar::open(dir.path()))).write("tok1", &user, auto_login);

            let reopened = CredentialStore::new(Arc::new(FileCookieJar::open(dir.path())));
            let creds = reopened.read();
            assert_eq!(creds.token.as_deref(), Some("tok1"));
            assert_eq!(creds.user, Some(user.clone()));
            assert_eq!(reopened.auto_login(), auto_login);

            let remaining = reopened.expires_at().unwrap() - Utc::now();
            assert!(remaining <= Duration::days(days));
            assert!(remaining > Duration::days(days) - Duration::minutes(1));

            reopened.clear();
            let cleared = CredentialStore::new(Arc::new(FileCookieJar::open(dir.path())));
            assert!(!cleared.is_authenticated());
            assert!(!cleared.auto_login());
        }
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("matchmate");

        let jar = FileCookieJar::open(&nested);
        jar.set(Cookie::new("a", "1", Duration::days(1)));
        assert!(jar.path().exists());
    }
}
