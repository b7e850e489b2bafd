use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::CurrentUser;
use crate::storage::{Cookie, CookieJar, MemoryCookieJar};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CURRENT_USER_COOKIE: &str = "current_user";
pub const AUTO_LOGIN_COOKIE: &str = "auto_login";

/// Credential lifetime when the user asked to stay signed in.
const AUTO_LOGIN_EXPIRY_DAYS: i64 = 30;

/// Credential lifetime for a regular sign-in.
const SESSION_EXPIRY_DAYS: i64 = 1;

/// What the store currently holds. Both fields absent means logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub user: Option<CurrentUser>,
}

/// Snapshot published to observers after every write or clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SessionState {
    pub is_authenticated: bool,
    pub current_user: Option<CurrentUser>,
}

impl From<&StoredCredentials> for SessionState {
    fn from(creds: &StoredCredentials) -> Self {
        Self {
            is_authenticated: creds.token.is_some(),
            current_user: creds.user.clone(),
        }
    }
}

/// Sole owner of the session token.
///
/// Clone is cheap and every clone shares the same jar and change channel, so
/// one store can be handed to both the API client and the session.
#[derive(Clone)]
pub struct CredentialStore {
    jar: Arc<dyn CookieJar>,
    changes: Arc<watch::Sender<SessionState>>,
}

impl CredentialStore {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        let store = Self {
            jar,
            changes: Arc::new(watch::Sender::new(SessionState::default())),
        };
        store.publish();
        store
    }

    /// Store backed by a fresh in-memory jar.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCookieJar::new()))
    }

    /// Persist a session, replacing whatever was stored before.
    pub fn write(&self, token: &str, user: &CurrentUser, auto_login: bool) {
        let max_age = Self::expiry_for(auto_login);

        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                // CurrentUser is plain data; this only trips on a serde bug.
                warn!(error = %e, "Failed to encode current user, session not stored");
                return;
            }
        };

        self.jar.set_all(vec![
            Cookie::new(ACCESS_TOKEN_COOKIE, token, max_age),
            Cookie::new(CURRENT_USER_COOKIE, user_json, max_age),
            Cookie::new(
                AUTO_LOGIN_COOKIE,
                auto_login.to_string(),
                Duration::days(AUTO_LOGIN_EXPIRY_DAYS),
            ),
        ]);
        debug!(user_id = %user.id, role = %user.role, auto_login, "Session stored");

        self.publish();
    }

    /// Return the persisted token and user.
    ///
    /// A user descriptor without a token is reported as logged out.
    pub fn read(&self) -> StoredCredentials {
        let token = self.jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value);
        let user = token.as_ref().and_then(|_| self.stored_user());
        StoredCredentials { token, user }
    }

    /// Remove token, user and auto-login preference.
    pub fn clear(&self) {
        self.jar
            .remove_all(&[ACCESS_TOKEN_COOKIE, CURRENT_USER_COOKIE, AUTO_LOGIN_COOKIE]);
        debug!("Session cleared");

        self.publish();
    }

    pub fn token(&self) -> Option<String> {
        self.read().token
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn auto_login(&self) -> bool {
        self.jar
            .get(AUTO_LOGIN_COOKIE)
            .map(|c| c.value == "true")
            .unwrap_or(false)
    }

    /// Expiry recorded for the stored token.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.expires_at)
    }

    /// Observe every write and clear.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    fn expiry_for(auto_login: bool) -> Duration {
        if auto_login {
            Duration::days(AUTO_LOGIN_EXPIRY_DAYS)
        } else {
            Duration::days(SESSION_EXPIRY_DAYS)
        }
    }

    fn stored_user(&self) -> Option<CurrentUser> {
        let cookie = self.jar.get(CURRENT_USER_COOKIE)?;
        match serde_json::from_str(&cookie.value) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed current_user cookie");
                None
            }
        }
    }

    fn publish(&self) {
        self.changes.send_replace(SessionState::from(&self.read()));
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
