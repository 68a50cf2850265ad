//! URL-safe organization slugs.
//!
//! Slugs are derived from the team name: lowercase ASCII letters and digits
//! separated by single hyphens, never starting or ending with one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Derive a slug from free text.
///
/// The input is lowercased, each maximal run of characters outside
/// `[a-z0-9]` collapses into one `-`, and a leading or trailing hyphen is
/// dropped. The result may be empty when the name has no usable characters.
///
/// # Examples
/// ```
/// use dashboard::domain::generate_slug;
///
/// assert_eq!(generate_slug("Better Blog!!"), "better-blog");
/// assert_eq!(generate_slug("  Acme  Inc "), "acme-inc");
/// assert_eq!(generate_slug("!!!"), "");
/// ```
pub fn generate_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if in_gap && !slug.is_empty() {
                slug.push('-');
            }
            in_gap = false;
            slug.push(ch);
        } else {
            in_gap = true;
        }
    }
    // A trailing gap stays pending and is never written.
    slug
}

/// Return `true` when `value` already satisfies the slug format.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Error returned when a string is not a valid slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    /// The value was empty, typically a name with no letters or digits.
    #[error("slug must contain at least one letter or digit")]
    Empty,
    /// The value contained characters outside the slug alphabet.
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    Malformed,
}

/// Validated organization slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Accept an already-formatted slug.
    pub fn parse(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if !is_valid_slug(&value) {
            return Err(SlugError::Malformed);
        }
        Ok(Self(value))
    }

    /// Derive the slug for a team name.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        Self::parse(generate_slug(name))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
