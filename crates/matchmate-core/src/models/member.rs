use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MemberStatus, Role};

/// A row of the member administration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Member {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    pub status: MemberStatus,
    #[serde(rename = "createdAt", default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Name for table display, falling back to the email address.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MemberStatus::Pending
    }
}

/// Body of the profile creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Partial update sent by the admin table. Only present fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
}

impl MemberUpdate {
    pub fn status(status: MemberStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_member_list() {
        let json = r#"[
            {"id": "1", "email": "ana@example.com", "name": "Ana", "role": "ADMIN", "status": "ACTIVE", "createdAt": "2024-03-01T12:00:00Z"},
            {"id": "2", "email": "bo@example.com", "role": "MEMBER", "status": "PENDING"}
        ]"#;

        let members: Vec<Member> = serde_json::from_str(json).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].display_name(), "Ana");
        assert!(members[0].created_at.is_some());
        assert_eq!(members[1].display_name(), "bo@example.com");
        assert!(members[1].is_pending());
    }

    #[test]
    fn test_member_update_omits_absent_fields() {
        let update = MemberUpdate::status(MemberStatus::Active);
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"status":"ACTIVE"}"#);

        let update = MemberUpdate::role(Role::Admin);
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"role":"ADMIN"}"#);
    }

    #[test]
    fn test_blank_name_falls_back_to_email() {
        let member = Member {
            id: "3".to_string(),
            email: "cy@example.com".to_string(),
            name: Some("  ".to_string()),
            role: Role::Member,
            status: MemberStatus::Inactive,
            created_at: None,
        };
        assert_eq!(member.display_name(), "cy@example.com");
    }
}
