//! REST API client module for the matchmate backend.
//!
//! This module provides the `ApiClient`, the authenticated request pipeline
//! every backend call goes through. It attaches the stored bearer token and
//! clears the session when the backend answers 401.
//!
//! The HTTP layer sits behind the `Transport` trait; `HttpTransport` is the
//! reqwest-backed implementation.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
