//! Data models for matchmate entities.
//!
//! - `CurrentUser`, `Role`, `MemberStatus`: the signed-in user descriptor
//! - `Member`, `NewProfile`, `MemberUpdate`: member administration and profiles

pub mod member;
pub mod user;

pub use member::{Member, MemberUpdate, NewProfile};
pub use user::{CurrentUser, MemberStatus, Role, UnknownVariant};
