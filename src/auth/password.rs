//! Password strength checks and bcrypt hashing.
//!
//! A raw password must pass [ValidatedPassword::new] before it can be hashed
//! into a [PasswordHash], which is the only form stored in the database.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// The bcrypt cost used when registering users.
#[cfg(not(test))]
pub(crate) const PASSWORD_COST: u32 = PasswordHash::DEFAULT_COST;
/// Tests use the minimum cost so that hashing stays fast.
#[cfg(test)]
pub(crate) const PASSWORD_COST: u32 = 4;

/// A password that is strong enough to use, but not yet hashed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's suggestions if the password
    /// scores below three.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .map(describe_feedback)
                    .unwrap_or_else(|| WEAK_PASSWORD_MESSAGE.to_owned()),
            )),
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Only used for the built-in demo account.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

const WEAK_PASSWORD_MESSAGE: &str = "The password is too easy to guess.";

fn describe_feedback(feedback: &Feedback) -> String {
    let description = feedback.to_string();

    if description.trim().is_empty() {
        WEAK_PASSWORD_MESSAGE.to_owned()
    } else {
        description
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "********")
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// bcrypt's recommended cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Validate then hash `raw_password`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] or [Error::HashingError].
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated_password, cost)
    }

    /// Check whether `raw_password` is the password this hash was made from.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        auth::{PasswordHash, ValidatedPassword, password::PASSWORD_COST},
    };

    #[test]
    fn rejects_empty_password() {
        assert!(matches!(ValidatedPassword::new(""), Err(Error::TooWeak(_))));
    }

    #[test]
    fn rejects_common_password() {
        let result = ValidatedPassword::new("password1234");

        let Err(Error::TooWeak(message)) = &result else {
            panic!("expected a weak password error, got {result:?}");
        };
        assert!(!message.is_empty());
    }

    #[test]
    fn accepts_long_password() {
        assert!(ValidatedPassword::new("correct horse battery staple 42").is_ok());
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("admin123");

        assert_eq!(password.to_string(), "********");
    }

    #[test]
    fn hash_verifies_only_original_password() {
        let hash = PasswordHash::from_raw_password("roostersgocockledoodledoo", PASSWORD_COST)
            .unwrap();

        assert_eq!(hash.verify("roostersgocockledoodledoo"), Ok(true));
        assert_eq!(hash.verify("turkeysgogobblegobble"), Ok(false));
    }

    #[test]
    fn hashing_is_salted() {
        let password = ValidatedPassword::new("turkeysgogobblegobble").unwrap();

        let first = PasswordHash::new(password.clone(), PASSWORD_COST).unwrap();
        let second = PasswordHash::new(password, PASSWORD_COST).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn verify_fails_on_malformed_hash() {
        let hash = PasswordHash::new_unchecked("not a bcrypt hash");

        assert!(matches!(hash.verify("anything"), Err(Error::HashingError(_))));
    }
}
