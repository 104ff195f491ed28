//! Password policy and Argon2 hashing.
//!
//! Plain passwords only exist inside [`Password`], which zeroizes its buffer
//! on drop. Persistence adapters only ever see the PHC-formatted
//! [`PasswordHash`].

use std::fmt;
use std::sync::OnceLock;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use zeroize::Zeroizing;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 6;

/// Errors raised while validating or hashing passwords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// Password was empty.
    #[error("Password is required.")]
    Empty,
    /// Password shorter than [`PASSWORD_MIN`].
    #[error("Password must be at least {min} characters.")]
    TooShort { min: usize },
    /// The hashing backend failed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
    /// The stored hash could not be parsed.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash { message: String },
}

/// Caller-supplied password that satisfies the length policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a raw password.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::{Password, PasswordError};
    ///
    /// assert!(Password::new("secret1").is_ok());
    /// assert_eq!(Password::new("abc").err(), Some(PasswordError::TooShort { min: 6 }));
    /// ```
    pub fn new(raw: &str) -> Result<Self, PasswordError> {
        if raw.is_empty() {
            return Err(PasswordError::Empty);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(PasswordError::TooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Hash the password with Argon2id and a fresh random salt.
    pub fn hash(&self) -> Result<PasswordHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|error| PasswordError::Hashing {
                message: error.to_string(),
            })?
            .to_string();
        Ok(PasswordHash(hash))
    }

    /// [`Password::hash`] on the blocking thread pool.
    pub async fn hash_off_thread(self) -> Result<PasswordHash, PasswordError> {
        tokio::task::spawn_blocking(move || self.hash())
            .await
            .map_err(|error| PasswordError::Hashing {
                message: error.to_string(),
            })?
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// PHC-formatted password hash as stored in the `users` table.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash loaded from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Check a candidate password against this hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// is unusable.
    pub fn verify(&self, candidate: &str) -> Result<bool, PasswordError> {
        let parsed = argon2::PasswordHash::new(&self.0).map_err(|error| {
            PasswordError::MalformedHash {
                message: error.to_string(),
            }
        })?;
        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

impl PasswordHash {
    /// [`PasswordHash::verify`] on the blocking thread pool.
    pub async fn verify_off_thread(
        self,
        candidate: Zeroizing<String>,
    ) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || self.verify(&candidate))
            .await
            .map_err(|error| PasswordError::Hashing {
                message: error.to_string(),
            })?
    }

    /// Hash checked when a login names an unknown user, so both rejection
    /// paths cost one Argon2 verification. `None` if hashing is unavailable.
    pub(crate) fn placeholder() -> Option<Self> {
        static PLACEHOLDER: OnceLock<Option<PasswordHash>> = OnceLock::new();
        PLACEHOLDER
            .get_or_init(|| {
                Password(Zeroizing::new("no-such-account".to_owned()))
                    .hash()
                    .ok()
            })
            .clone()
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", PasswordError::Empty)]
    #[case("12345", PasswordError::TooShort { min: PASSWORD_MIN })]
    fn rejects_weak_passwords(#[case] raw: &str, #[case] expected: PasswordError) {
        assert_eq!(Password::new(raw).err(), Some(expected));
    }

    #[rstest]
    fn hash_verifies_matching_password_only() {
        let password = Password::new("admin123").expect("valid password");
        let hash = password.hash().expect("hashing succeeds");

        assert!(hash.as_ref().starts_with("$argon2"));
        assert!(hash.verify("admin123").expect("verify succeeds"));
        assert!(!hash.verify("admin124").expect("verify succeeds"));
    }

    #[rstest]
    fn hashes_use_distinct_salts() {
        let password = Password::new("admin123").expect("valid password");
        let first = password.hash().expect("hashing succeeds");
        let second = password.hash().expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_reported() {
        let hash = PasswordHash::from_stored("not-a-phc-string");
        assert!(matches!(
            hash.verify("anything"),
            Err(PasswordError::MalformedHash { .. })
        ));
    }

    #[tokio::test]
    async fn off_thread_helpers_match_inline_behaviour() {
        let hash = Password::new("admin123")
            .expect("valid password")
            .hash_off_thread()
            .await
            .expect("hashing succeeds");

        let accepted = hash
            .clone()
            .verify_off_thread(Zeroizing::new("admin123".to_owned()))
            .await
            .expect("verify succeeds");
        let rejected = hash
            .verify_off_thread(Zeroizing::new("admin124".to_owned()))
            .await
            .expect("verify succeeds");
        assert!(accepted);
        assert!(!rejected);
    }

    #[rstest]
    fn placeholder_is_a_real_hash_that_rejects_guesses() {
        let placeholder = PasswordHash::placeholder().expect("placeholder hash");
        assert!(placeholder.as_ref().starts_with("$argon2id$"));
        assert!(!placeholder.verify("admin123").expect("verify succeeds"));
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let password = Password::new("admin123").expect("valid password");
        assert!(!format!("{password:?}").contains("admin123"));
    }
}
