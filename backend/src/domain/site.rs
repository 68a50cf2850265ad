//! Blog sites owned by organizations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::domain::organization::OrganizationId;
use crate::domain::text::{NAME_MAX, NameRule, normalise_name};

/// Length of generated site identifiers.
pub const SITE_ID_LEN: usize = 21;

const SITE_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Validation errors for site fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteValidationError {
    /// Identifier had the wrong length or alphabet.
    #[error("site id must be {len} URL-safe characters", len = SITE_ID_LEN)]
    InvalidId,
    /// Blank name.
    #[error("site name must not be empty")]
    EmptyName,
    /// Name longer than the limit.
    #[error("site name must be at most {max} characters")]
    NameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
    /// Blank URL.
    #[error("site url must not be empty")]
    EmptyUrl,
    /// URL failed to parse or used another scheme.
    #[error("site url must be an absolute http or https URL")]
    InvalidUrl,
}

/// Short random site identifier drawn from a URL-safe alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..SITE_ID_LEN)
            .filter_map(|_| SITE_ID_ALPHABET.choose(&mut rng).copied().map(char::from))
            .collect();
        Self(id)
    }

    /// Validate an existing identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SiteValidationError> {
        let raw = raw.into();
        let well_formed = raw.len() == SITE_ID_LEN
            && raw.bytes().all(|byte| SITE_ID_ALPHABET.contains(&byte));
        if well_formed {
            Ok(Self(raw))
        } else {
            Err(SiteValidationError::InvalidId)
        }
    }
}

impl AsRef<str> for SiteId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SiteId> for String {
    fn from(value: SiteId) -> Self {
        value.0
    }
}

impl FromStr for SiteId {
    type Err = SiteValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SiteId {
    type Error = SiteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Display name of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteName(String);

impl SiteName {
    /// Trim and validate a site name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SiteValidationError> {
        normalise_name(raw.as_ref())
            .map(Self)
            .map_err(|rule| match rule {
                NameRule::Blank => SiteValidationError::EmptyName,
                NameRule::TooLong => SiteValidationError::NameTooLong { max: NAME_MAX },
            })
    }
}

impl AsRef<str> for SiteName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SiteName> for String {
    fn from(value: SiteName) -> Self {
        value.0
    }
}

impl TryFrom<String> for SiteName {
    type Error = SiteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public address of a site.
///
/// The original input is kept verbatim (after trimming) so users see the
/// URL exactly as they typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteUrl(String);

impl SiteUrl {
    /// Validate an absolute `http`/`https` URL with a host.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SiteValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SiteValidationError::EmptyUrl);
        }
        let parsed = Url::parse(trimmed).map_err(|_| SiteValidationError::InvalidUrl)?;
        let scheme_ok = matches!(parsed.scheme(), "http" | "https");
        let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
        if !(scheme_ok && has_host) {
            return Err(SiteValidationError::InvalidUrl);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for SiteUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SiteUrl> for String {
    fn from(value: SiteUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for SiteUrl {
    type Error = SiteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A blog belonging to exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Identifier.
    #[schema(value_type = String, example = "V1StGXR8_Z5jdHi6B-myT")]
    pub id: SiteId,
    /// Owning organization.
    #[schema(value_type = String, format = Uuid)]
    pub organization_id: OrganizationId,
    /// Display name.
    #[schema(value_type = String, example = "Engineering Blog")]
    pub name: SiteName,
    /// Public address.
    #[schema(value_type = String, example = "https://blog.example.com")]
    pub url: SiteUrl,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
