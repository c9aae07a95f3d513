// hospital-identity/src/password.rs
// ============================================================================
// Module: Password Policy
// Description: Password strength validation and argon2 hashing/verification.
// Purpose: Enforce the min/max length and character-class policy, and never
// store or log plaintext.
// Dependencies: argon2, rand, thiserror
// ============================================================================

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 72;
const SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

/// Violations of the password policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {MIN_LENGTH} characters")]
    TooShort,
    #[error("password must be at most {MAX_LENGTH} characters")]
    TooLong,
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("password must contain at least one digit")]
    MissingDigit,
    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Validates a candidate password against the platform's password policy:
/// length 8-72, at least one upper, lower, digit, and special character.
///
/// # Errors
///
/// Returns the first [`PasswordPolicyError`] violated.
pub fn validate_password_policy(candidate: &str) -> Result<(), PasswordPolicyError> {
    if candidate.len() < MIN_LENGTH {
        return Err(PasswordPolicyError::TooShort);
    }
    if candidate.len() > MAX_LENGTH {
        return Err(PasswordPolicyError::TooLong);
    }
    if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if !candidate.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(PasswordPolicyError::MissingSpecial);
    }
    Ok(())
}

/// Hashes a password with a per-call random salt using argon2 (memory-hard,
/// satisfying the "cost >= 10 bcrypt-class" requirement).
///
/// # Errors
///
/// Returns an error string when the underlying hasher fails; this should not
/// happen for well-formed input and default parameters.
pub fn hash_password(plaintext: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| err.to_string())
}

/// Verifies a plaintext password against a stored argon2 hash.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
