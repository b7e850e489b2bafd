use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Anonymous,
    Member,
    Admin,
}

/// Lifecycle state of a member account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Pending,
    Inactive,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Anonymous => "ANONYMOUS",
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    /// Case-insensitive, so redirect parameters like `admin` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ANONYMOUS" => Ok(Role::Anonymous),
            "MEMBER" => Ok(Role::Member),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "PENDING",
            MemberStatus::Inactive => "INACTIVE",
            MemberStatus::Active => "ACTIVE",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(MemberStatus::Pending),
            "INACTIVE" => Ok(MemberStatus::Inactive),
            "ACTIVE" => Ok(MemberStatus::Active),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// The signed-in user as persisted next to the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
    pub status: MemberStatus,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, role: Role, status: MemberStatus) -> Self {
        Self {
            id: id.into(),
            role,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_json_uses_uppercase_enums() {
        let user = CurrentUser::new("42", Role::Member, MemberStatus::Active);
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":"42","role":"MEMBER","status":"ACTIVE"}"#);

        let parsed: CurrentUser = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_role_from_str_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" Member ".parse::<Role>(), Ok(Role::Member));
        assert_eq!("anonymous".parse::<Role>(), Ok(Role::Anonymous));
    }

    #[test]
    fn test_unknown_variants_are_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "role");
        assert_eq!(err.value, "superuser");

        assert!("banned".parse::<MemberStatus>().is_err());
        assert!("".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_status_display_round_trips_through_from_str() {
        for status in [MemberStatus::Pending, MemberStatus::Inactive, MemberStatus::Active] {
            assert_eq!(status.to_string().parse::<MemberStatus>(), Ok(status));
        }
    }
}
