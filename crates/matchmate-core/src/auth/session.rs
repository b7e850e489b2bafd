use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::credentials::{CredentialStore, SessionState};
use super::oauth::{OAuthError, OAuthRedirect};
use crate::models::CurrentUser;

/// Where the rendering layer should go after a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Home,
    Login,
}

/// Session facade for the rendering layer.
///
/// State is recomputed from the credential store on every read, so a forced
/// clear by the API client is visible here without any extra bookkeeping.
pub struct Session {
    store: CredentialStore,
    navigation: mpsc::UnboundedSender<Navigation>,
}

impl Session {
    /// Create a session over `store`, returning the navigation signal receiver.
    pub fn new(store: CredentialStore) -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (navigation, rx) = mpsc::unbounded_channel();
        (Self { store, navigation }, rx)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.store.current_user()
    }

    pub fn state(&self) -> SessionState {
        SessionState::from(&self.store.read())
    }

    /// Observe authenticated/unauthenticated transitions, including forced
    /// clears after a rejected request.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.store
    }

    pub fn login(&self, token: &str, user: CurrentUser, auto_login: bool) {
        self.store.write(token, &user, auto_login);
        info!(user_id = %user.id, role = %user.role, "Logged in");
        self.navigate(Navigation::Home);
    }

    pub fn logout(&self) {
        self.store.clear();
        info!("Logged out");
        self.navigate(Navigation::Login);
    }

    /// Finish an external OAuth login from its redirect URL.
    pub fn complete_oauth(&self, redirect_url: &str, auto_login: bool) -> Result<CurrentUser, OAuthError> {
        let redirect = OAuthRedirect::parse(redirect_url)?;
        self.login(&redirect.token, redirect.user.clone(), auto_login);
        Ok(redirect.user)
    }

    fn navigate(&self, to: Navigation) {
        if self.navigation.send(to).is_err() {
            warn!(?to, "No navigation listener");
        }
    }
}
