//! User data model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyUsername,
    UsernameLength { min: usize, max: usize },
    UsernameInvalidCharacters,
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a positive integer"),
            Self::EmptyUsername => write!(f, "Username is required."),
            Self::UsernameLength { min, max } => {
                write!(f, "Username must be between {min} and {max} characters.")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "Username may only contain letters, numbers, dots, dashes, or underscores."
            ),
            Self::EmptyEmail => write!(f, "Email is required."),
            Self::EmailTooLong { max } => write!(f, "Email must be at most {max} characters."),
            Self::InvalidEmail => write!(f, "Invalid email address."),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Database-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UserId(i32);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: i32) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Raw integer value used by persistence adapters.
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i32> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username (matches the column width).
pub const USERNAME_MAX: usize = 80;
/// Maximum allowed length for an email address (matches the column width).
pub const EMAIL_MAX: usize = 120;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Unique login name.
///
/// ## Invariants
/// - Trimmed, between [`USERNAME_MIN`] and [`USERNAME_MAX`] characters.
/// - Letters, digits, `_`, `.`, and `-` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::Username;
    ///
    /// let name = Username::new("  dr_smith ").expect("valid username");
    /// assert_eq!(name.as_ref(), "dr_smith");
    /// assert!(Username::new("a b").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !username_regex().is_match(trimmed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact email, stored lower-cased so uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Admin@Hospital.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "admin@hospital.com");
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalized.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !is_plausible_email(&normalized) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
        && !domain.ends_with('.')
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered application user.
///
/// Password hashes are only exposed through [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

/// User data required to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: super::PasswordHash,
}

/// Stored user alongside its password hash, returned only for login checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: super::PasswordHash,
}
