//! matchmate-core - session lifecycle and authenticated API access for the
//! matchmate member service.
//!
//! A single `CredentialStore` is created per user context and handed to both
//! the `ApiClient` (which reads the token on every request and clears it on a
//! 401) and the `Session` (which the rendering layer observes and drives).

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, Navigation, Session, SessionState};
pub use config::Config;
pub use models::{CurrentUser, Member, MemberStatus, Role};
