//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same invariants.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

pub(crate) const CATEGORY_MAX_LEN: usize = 64;
pub(crate) const NOTE_MAX_LEN: usize = 500;
pub(crate) const EMAIL_MAX_LEN: usize = 254;
pub(crate) const PASSWORD_MIN_LEN: usize = 8;
pub(crate) const PASSWORD_MAX_LEN: usize = 256;

/// Largest single expense, in cents (one billion units). Keeps `SUM` over
/// any realistic number of rows inside `i64`.
pub const MAX_AMOUNT_MINOR: i64 = 100_000_000_000;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("{label} not exists")))
}

/// Trimmed, non-empty category of bounded length.
pub(crate) fn normalize_category(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "category must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > CATEGORY_MAX_LEN {
        return Err(EngineError::InvalidName(format!(
            "category must be at most {CATEGORY_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trimmed note; blank notes are stored as `None`.
pub(crate) fn normalize_note(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > NOTE_MAX_LEN {
        return Err(EngineError::InvalidName(format!(
            "note must be at most {NOTE_MAX_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Unicode lowercase form of a note, stored next to it for searching.
pub(crate) fn fold_note(note: Option<&str>) -> Option<String> {
    note.map(str::to_lowercase)
}

pub(crate) fn validate_amount(amount_minor: i64) -> ResultEngine<MoneyCents> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be > 0".to_string(),
        ));
    }
    if amount_minor > MAX_AMOUNT_MINOR {
        return Err(EngineError::InvalidAmount(format!(
            "amount_minor must be <= {MAX_AMOUNT_MINOR}"
        )));
    }
    Ok(MoneyCents::new(amount_minor))
}

/// Minimal shape check: one `@` with something on both sides.
///
/// The address is kept exactly as typed (lookups are case-sensitive).
pub(crate) fn validate_email(value: &str) -> ResultEngine<&str> {
    let invalid = || EngineError::InvalidName("invalid email address".to_string());
    let email = value.trim();
    if email.is_empty() || email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(invalid()),
    }
}

pub(crate) fn validate_password(value: &str) -> ResultEngine<()> {
    let len = value.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(EngineError::InvalidName(format!(
            "password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
///
/// The result must be used with `ESCAPE '\'`.
pub(crate) fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
