//! Driving port for tenant mutations.

use async_trait::async_trait;

use crate::domain::{
    Error, Organization, OrganizationId, OrganizationName, Site, SiteName, SiteUrl, UserId,
};

/// Request to create an organization owned by the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrganizationRequest {
    /// Team name; the slug is derived from it.
    pub name: OrganizationName,
}

/// Request to create a site inside an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSiteRequest {
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Site name.
    pub name: SiteName,
    /// Public address.
    pub url: SiteUrl,
}

/// Domain use-case port for creating organizations and sites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenancyCommand: Send + Sync {
    /// Create an organization and make the actor its owner.
    async fn create_organization(
        &self,
        actor: &UserId,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, Error>;

    /// Create a site; the actor must belong to the organization.
    async fn create_site(&self, actor: &UserId, request: CreateSiteRequest) -> Result<Site, Error>;
}
