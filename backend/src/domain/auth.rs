//! Authentication primitives: login credentials and registration requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Password, PasswordError, UserValidationError, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required."),
            Self::EmptyPassword => write!(f, "Password is required."),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use diagnoseai::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "admin123").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "admin123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Field-scoped validation failure for registration forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Username failed validation.
    #[error("{0}")]
    Username(UserValidationError),
    /// Email failed validation.
    #[error("{0}")]
    Email(UserValidationError),
    /// Password failed the policy.
    #[error("{0}")]
    Password(PasswordError),
    /// Confirmation did not match the password.
    #[error("Passwords must match.")]
    PasswordMismatch,
}

impl RegistrationValidationError {
    /// Form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Email(_) => "email",
            Self::Password(_) => "password",
            Self::PasswordMismatch => "confirmPassword",
        }
    }
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl Registration {
    /// Validate raw registration form inputs.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::Registration;
    ///
    /// let ok = Registration::try_from_parts("nurse", "nurse@hospital.com", "secret1", "secret1");
    /// assert!(ok.is_ok());
    /// let mismatch = Registration::try_from_parts("nurse", "nurse@hospital.com", "secret1", "secret2");
    /// assert!(mismatch.is_err());
    /// ```
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username).map_err(RegistrationValidationError::Username)?;
        let email = EmailAddress::new(email).map_err(RegistrationValidationError::Email)?;
        let password = Password::new(password).map_err(RegistrationValidationError::Password)?;
        if password.expose() != confirm_password {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        Ok(Self {
            username,
            email,
            password,
        })
    }
}
