//! Password policy enforcement.
//!
//! Registration-time strength rules: length bounds, required character
//! classes, and a short blacklist of notoriously common passwords. The
//! scoring half backs a self-service strength probe so clients can show
//! feedback before a registration attempt is submitted.

use serde::Serialize;

/// Minimum accepted password length.
pub const MIN_LENGTH: usize = 8;
/// Maximum accepted password length.
pub const MAX_LENGTH: usize = 128;
/// Characters counted as special by the strength score.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Rejected outright regardless of composition.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "letmein",
    "welcome",
    "password1",
];

/// Validates a password against the policy.
///
/// Collects every violated rule rather than stopping at the first, so
/// clients can present the complete list in one round trip.
pub fn validate(password: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let length = password.chars().count();

    if length < MIN_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_LENGTH} characters long"
        ));
    }
    if length > MAX_LENGTH {
        errors.push(format!("Password must not exceed {MAX_LENGTH} characters"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit".to_string());
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.push("Password is too common. Please choose a stronger password".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Coarse strength band derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

/// Strength probe result: a 0-100 score and its band.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Strength {
    pub score: u8,
    pub level: StrengthLevel,
}

/// Scores a password for client-side feedback.
///
/// Length tiers contribute up to 40 points and each character class another
/// 15. Scoring is independent of [`validate`]: a blacklisted password still
/// receives its compositional score.
pub fn strength(password: &str) -> Strength {
    let mut score: u8 = 0;
    let length = password.chars().count();

    if length >= 8 {
        score += 20;
    }
    if length >= 12 {
        score += 10;
    }
    if length >= 16 {
        score += 10;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    }
    if password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        score += 15;
    }

    let level = match score {
        0..40 => StrengthLevel::Weak,
        40..60 => StrengthLevel::Medium,
        60..80 => StrengthLevel::Strong,
        _ => StrengthLevel::VeryStrong,
    };

    Strength {
        score: score.min(100),
        level,
    }
}
