//! Input validation helpers
//!
//! Centralized text length constants and normalization for order input.
//! SQLite TEXT has no built-in length enforcement.

use crate::orders::OrderError;

// ── Text length limits ──────────────────────────────────────────────

/// Table labels
pub const MAX_LABEL_LEN: usize = 200;

/// Customer notes (also the cap applied before forwarding)
pub const MAX_NOTE_LEN: usize = 500;

/// Order numbers (`ORD-yyMMddHHmmss` plus admin suffixes)
pub const MAX_ORDER_NUMBER_LEN: usize = 50;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::Validation(format!("{field} must not be empty")));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(OrderError::Validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

/// Trim an optional note; blank becomes `None`, overlong is rejected.
pub fn normalize_note(value: Option<String>, field: &str) -> Result<Option<String>, OrderError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > MAX_NOTE_LEN {
        return Err(OrderError::Validation(format!(
            "{field} is too long ({len} chars, max {MAX_NOTE_LEN})"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Clean free text before it leaves this service: trim, drop control
/// characters and angle brackets, cap at [`MAX_NOTE_LEN`] chars.
pub fn sanitize_text(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .take(MAX_NOTE_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
