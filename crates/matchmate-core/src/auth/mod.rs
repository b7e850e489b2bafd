//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `CredentialStore`: token, user descriptor and auto-login flag persisted in a cookie jar
//! - `Session`: observable session state plus the `login`/`logout` commands
//! - `OAuthRedirect`: parsing of the external OAuth login redirect
//!
//! Sessions last 1 day, or 30 days when auto-login is enabled.

pub mod credentials;
pub mod oauth;
pub mod session;

pub use credentials::{CredentialStore, SessionState, StoredCredentials};
pub use oauth::{OAuthError, OAuthRedirect};
pub use session::{Navigation, Session};
