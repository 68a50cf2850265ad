//! Organizations ("teams") and their memberships.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::slug::Slug;
use crate::domain::text::{NAME_MAX, NameRule, normalise_name};
use crate::domain::user::UserId;

/// Organization identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(Uuid);

impl OrganizationId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OrganizationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Validation errors for organization names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrganizationValidationError {
    /// Blank after trimming.
    #[error("team name must not be empty")]
    EmptyName,
    /// Longer than the limit.
    #[error("team name must be at most {max} characters")]
    NameTooLong {
        /// Maximum number of characters.
        max: usize,
    },
}

/// Display name of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationName(String);

impl OrganizationName {
    /// Trim and validate an organization name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, OrganizationValidationError> {
        normalise_name(raw.as_ref())
            .map(Self)
            .map_err(|rule| match rule {
                NameRule::Blank => OrganizationValidationError::EmptyName,
                NameRule::TooLong => OrganizationValidationError::NameTooLong { max: NAME_MAX },
            })
    }
}

impl AsRef<str> for OrganizationName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<OrganizationName> for String {
    fn from(value: OrganizationName) -> Self {
        value.0
    }
}

impl TryFrom<String> for OrganizationName {
    type Error = OrganizationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A tenant grouping users and sites.
///
/// ## Invariants
/// - `slug` is unique across all organizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: OrganizationId,
    /// Display name.
    #[schema(value_type = String, example = "Better Blog")]
    pub name: OrganizationName,
    /// Unique URL-safe handle derived from the name.
    #[schema(value_type = String, example = "better-blog")]
    pub slug: Slug,
    /// Optional logo URL.
    pub logo: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Role a user holds within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Created the organization.
    Owner,
    /// Invited collaborator.
    Member,
}

impl MemberRole {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown member role: {other}")),
        }
    }
}

/// Links a user to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    /// Organization joined.
    pub organization_id: OrganizationId,
    /// Member.
    pub user_id: UserId,
    /// Role held.
    pub role: MemberRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
}
