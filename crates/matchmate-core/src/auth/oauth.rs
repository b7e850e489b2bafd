//! Handling of the redirect the backend issues after an external OAuth login.
//!
//! The redirect carries the session in its query string:
//! `.../oauth/success?token=...&id=...&role=MEMBER&status=ACTIVE`.
//! The parsed result is written through the regular credential store.

use reqwest::Url;
use thiserror::Error;

use crate::models::{CurrentUser, MemberStatus, Role, UnknownVariant};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Invalid redirect URL: {0}")]
    InvalidUrl(String),

    #[error("OAuth login was rejected: {0}")]
    Denied(String),

    #[error("Redirect is missing the '{0}' parameter")]
    MissingParameter(&'static str),

    #[error("Redirect has an invalid {}: {}", .0.kind, .0.value)]
    InvalidValue(#[from] UnknownVariant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub token: String,
    pub user: CurrentUser,
}

impl OAuthRedirect {
    /// Parse a full redirect URL or a bare query string.
    pub fn parse(redirect: &str) -> Result<Self, OAuthError> {
        let url = Self::to_url(redirect.trim())?;

        let mut token = None;
        let mut id = None;
        let mut role = None;
        let mut status = None;

        for (key, value) in url.query_pairs() {
            match &*key {
                "token" => token = Some(value.into_owned()),
                "id" => id = Some(value.into_owned()),
                "role" => role = Some(value.parse::<Role>()?),
                "status" => status = Some(value.parse::<MemberStatus>()?),
                "error" => return Err(OAuthError::Denied(value.into_owned())),
                _ => {}
            }
        }

        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingParameter("token"))?;
        let id = id
            .filter(|i| !i.is_empty())
            .ok_or(OAuthError::MissingParameter("id"))?;
        let role = role.ok_or(OAuthError::MissingParameter("role"))?;
        let status = status.ok_or(OAuthError::MissingParameter("status"))?;

        Ok(Self {
            token,
            user: CurrentUser::new(id, role, status),
        })
    }

    fn to_url(redirect: &str) -> Result<Url, OAuthError> {
        if let Ok(url) = Url::parse(redirect) {
            return Ok(url);
        }

        // Bare query string, with or without the leading '?'
        let query = redirect.trim_start_matches('?');
        if query.is_empty() || query.contains(' ') {
            return Err(OAuthError::InvalidUrl(redirect.to_string()));
        }
        let mut url = Url::parse("matchmate://oauth/success")
            .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;
        url.set_query(Some(query));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_redirect_url() {
        let redirect = OAuthRedirect::parse(
            "https://app.example.com/oauth/success?token=abc.def&id=42&role=MEMBER&status=ACTIVE",
        )
        .unwrap();

        assert_eq!(redirect.token, "abc.def");
        assert_eq!(
            redirect.user,
            CurrentUser::new("42", Role::Member, MemberStatus::Active)
        );
    }

    #[test]
    fn test_parse_bare_query_with_encoding() {
        let redirect = OAuthRedirect::parse("?token=a%2Bb%3D&id=7&role=admin&status=pending").unwrap();

        assert_eq!(redirect.token, "a+b=");
        assert_eq!(redirect.user.role, Role::Admin);
        assert_eq!(redirect.user.status, MemberStatus::Pending);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = OAuthRedirect::parse("id=7&role=MEMBER&status=ACTIVE").unwrap_err();
        assert_eq!(err, OAuthError::MissingParameter("token"));

        let err = OAuthRedirect::parse("token=&id=7&role=MEMBER&status=ACTIVE").unwrap_err();
        assert_eq!(err, OAuthError::MissingParameter("token"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = OAuthRedirect::parse("token=t&id=7&role=ROOT&status=ACTIVE").unwrap_err();
        assert!(matches!(err, OAuthError::InvalidValue(UnknownVariant { kind: "role", .. })));
    }

    #[test]
    fn test_error_parameter_reports_denial() {
        let err = OAuthRedirect::parse("https://app.example.com/oauth/success?error=access_denied")
            .unwrap_err();
        assert_eq!(err, OAuthError::Denied("access_denied".to_string()));
    }

    #[test]
    fn test_empty_redirect_is_invalid() {
        assert!(matches!(OAuthRedirect::parse("  "), Err(OAuthError::InvalidUrl(_))));
    }
}
