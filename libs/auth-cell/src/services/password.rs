use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::instrument;

use crate::models::{CredentialError, MIN_PASSWORD_LENGTH};

pub struct PasswordService;

impl PasswordService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// `Ok(false)` for a wrong password, `Err` only for an unreadable hash.
    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed_hash = PasswordHash::new(hash)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate_registration(username: &str, password: &str) -> Result<(), CredentialError> {
        if username.trim().is_empty() {
            return Err(CredentialError::Validation("Username must not be empty".to_string()));
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = PasswordService::hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordService::verify_password("correct horse", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = PasswordService::hash_password("same password").unwrap();
        let second = PasswordService::hash_password("same password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert_matches!(
            PasswordService::verify_password("anything", "not-a-hash"),
            Err(CredentialError::Hashing(_))
        );
    }

    #[test]
    fn registration_rules() {
        assert!(PasswordService::validate_registration("asha", "longenough").is_ok());
        assert_matches!(PasswordService::validate_registration("  ", "longenough"), Err(CredentialError::Validation(_)));
        assert_matches!(PasswordService::validate_registration("asha", "short"), Err(CredentialError::Validation(_)));
    }
}
