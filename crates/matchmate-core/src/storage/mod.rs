//! Cookie-style key/value persistence with per-entry expiry.
//!
//! This module provides:
//! - `CookieJar`: the storage seam used by the credential store
//! - `MemoryCookieJar`: process-local jar, used in tests and embedders
//! - `FileCookieJar`: jar persisted as JSON in the cache directory
//!
//! Expired entries are treated as absent on read.

pub mod cookie;
pub mod file;

pub use cookie::{Cookie, CookieJar, MemoryCookieJar};
pub use file::FileCookieJar;
