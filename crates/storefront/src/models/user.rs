//! Store users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kedai_core::{Email, UserId, UserRole};

use super::{ValidationError, optional_text, required_text};

const MAX_USERNAME_LENGTH: usize = 64;

/// A store user as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// A validated user ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    email: Email,
    role: UserRole,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the username is blank or too long or
    /// the email is malformed.
    pub fn new(username: &str, email: &str, role: UserRole) -> Result<Self, ValidationError> {
        Ok(Self {
            username: validate_username(username)?,
            email: parse_email(email)?,
            role,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }
}

/// A validated partial update. Absent fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    username: Option<String>,
    email: Option<Email>,
    role: Option<UserRole>,
}

impl UserChanges {
    /// Validate the fields that are present. Blank strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a malformed email or an overlong
    /// username.
    pub fn new(
        username: Option<&str>,
        email: Option<&str>,
        role: Option<UserRole>,
    ) -> Result<Self, ValidationError> {
        let username = optional_text(username)
            .map(|name| validate_username(&name))
            .transpose()?;
        let email = optional_text(email)
            .map(|raw| parse_email(&raw))
            .transpose()?;

        Ok(Self {
            username,
            email,
            role,
        })
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    #[must_use]
    pub const fn role(&self) -> Option<UserRole> {
        self.role
    }
}

/// Body of `PUT /api/users/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChangesRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl UserChangesRequest {
    /// # Errors
    ///
    /// See [`UserChanges::new`].
    pub fn validate(&self) -> Result<UserChanges, ValidationError> {
        UserChanges::new(self.username.as_deref(), self.email.as_deref(), self.role)
    }
}

fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let username = required_text("username", raw)?;
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::invalid(
            "username",
            format!("must be at most {MAX_USERNAME_LENGTH} characters"),
        ));
    }
    Ok(username)
}

fn parse_email(raw: &str) -> Result<Email, ValidationError> {
    Email::parse(raw).map_err(|e| ValidationError::invalid("email", e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = NewUser::new(" admin ", "admin@kedai.id", UserRole::Admin).unwrap();
        assert_eq!(user.username(), "admin");
        assert_eq!(user.email().as_str(), "admin@kedai.id");

        assert_eq!(
            NewUser::new("", "admin@kedai.id", UserRole::Admin),
            Err(ValidationError::Missing("username"))
        );
        assert!(matches!(
            NewUser::new(&"x".repeat(65), "admin@kedai.id", UserRole::Admin),
            Err(ValidationError::Invalid { field: "username", .. })
        ));
    }

    #[test]
    fn test_changes_skip_blank_fields() {
        let changes = UserChanges::new(Some("  "), None, Some(UserRole::Admin)).unwrap();
        assert_eq!(changes.username(), None);
        assert_eq!(changes.email(), None);
        assert_eq!(changes.role(), Some(UserRole::Admin));
    }

    #[test]
    fn test_changes_reject_bad_email() {
        assert!(matches!(
            UserChanges::new(None, Some("nope"), None),
            Err(ValidationError::Invalid { field: "email", .. })
        ));
    }

    #[test]
    fn test_request_role_wire_name() {
        let request: UserChangesRequest = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert_eq!(request.validate().unwrap().role(), Some(UserRole::Admin));
        assert!(serde_json::from_str::<UserChangesRequest>(r#"{"role": "root"}"#).is_err());
    }
}
