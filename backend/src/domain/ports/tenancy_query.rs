//! Driving port for tenant-scoped reads.

use async_trait::async_trait;

use crate::domain::{Error, Organization, OrganizationId, Site, Slug, UserId};

/// Domain use-case port listing organizations and sites.
///
/// Reads go through the authorization guard: a non-member receives an empty
/// list rather than an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenancyQuery: Send + Sync {
    /// Organizations the actor belongs to.
    async fn organizations(&self, actor: &UserId) -> Result<Vec<Organization>, Error>;

    /// Sites of `organization_id` visible to the actor.
    async fn sites(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, Error>;

    /// Return `true` when no organization uses `slug` yet.
    async fn slug_available(&self, slug: &Slug) -> Result<bool, Error>;
}
