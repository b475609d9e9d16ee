use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Why a signup or signin payload was rejected before reaching the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email is required")]
    EmailRequired,
    #[error("email format is invalid")]
    EmailInvalid,
    #[error("password is required")]
    PasswordRequired,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("password must contain letters and numbers")]
    PasswordTooWeak,
}

impl ValidationError {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailRequired => "email_required",
            Self::EmailInvalid => "email_invalid",
            Self::PasswordRequired => "password_required",
            Self::PasswordTooShort => "password_too_short",
            Self::PasswordTooWeak => "password_too_weak",
        }
    }
}

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Validated input. `email` is trimmed and lowercased.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Applies the credential rules in order; the first failing rule wins.
///
/// Password length is counted in chars (Unicode scalar values), so `"pässwörd1"`
/// is nine long even though it takes eleven bytes.
pub fn validate(email: &str, password: &str) -> Result<Credentials, ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmailRequired);
    }

    let email = trimmed.to_lowercase().trim().to_string();
    if !is_valid_email(&email) {
        return Err(ValidationError::EmailInvalid);
    }

    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ValidationError::PasswordTooWeak);
    }

    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}
