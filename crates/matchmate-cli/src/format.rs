//! Table and text formatting for terminal output.

use chrono::{DateTime, Utc};
use matchmate_core::Member;

const ID_WIDTH: usize = 10;
const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 32;

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

pub fn member_header() -> String {
    format!(
        "{:<id$}  {:<name$}  {:<email$}  {:<6}  {}",
        "ID",
        "NAME",
        "EMAIL",
        "ROLE",
        "STATUS",
        id = ID_WIDTH,
        name = NAME_WIDTH,
        email = EMAIL_WIDTH,
    )
}

pub fn member_row(member: &Member) -> String {
    format!(
        "{:<id$}  {:<name$}  {:<email$}  {:<6}  {}",
        truncate(&member.id, ID_WIDTH),
        truncate(member.display_name(), NAME_WIDTH),
        truncate(&member.email, EMAIL_WIDTH),
        member.role.as_str(),
        member.status,
        id = ID_WIDTH,
        name = NAME_WIDTH,
        email = EMAIL_WIDTH,
    )
}

/// "in 23h" / "in 29d" style remaining time
pub fn format_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expires_at - now;
    if remaining.num_minutes() <= 0 {
        "expired".to_string()
    } else if remaining.num_hours() < 1 {
        format!("in {}m", remaining.num_minutes())
    } else if remaining.num_days() < 1 {
        format!("in {}h", remaining.num_hours())
    } else {
        format!("in {}d", remaining.num_days())
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}
