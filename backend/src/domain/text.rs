//! Shared rules for short human-entered labels.
//!
//! Team, site and user names all follow the same policy: surrounding
//! whitespace is dropped and the remainder must hold between one and
//! [`NAME_MAX`] characters.

/// Maximum number of characters allowed in a name label.
pub const NAME_MAX: usize = 100;

/// Reason a name label was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameRule {
    Blank,
    TooLong,
}

/// Trim `raw` and enforce the length bounds.
pub(crate) fn normalise_name(raw: &str) -> Result<String, NameRule> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NameRule::Blank);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(NameRule::TooLong);
    }
    Ok(trimmed.to_owned())
}
