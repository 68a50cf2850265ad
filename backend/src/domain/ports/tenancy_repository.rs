//! Port abstraction for organization, membership and site storage.

use async_trait::async_trait;

use crate::domain::{Membership, MemberRole, Organization, OrganizationId, Site, Slug, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tenancy repository adapters.
    pub enum TenancyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "tenancy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tenancy repository query failed: {message}",
        /// The organization slug is already used.
        DuplicateSlug { slug: String } => "organization slug {slug} is already taken",
    }
}

/// Driven port for tenancy storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenancyRepository: Send + Sync {
    /// Insert an organization and its owner membership atomically.
    async fn create_organization(
        &self,
        organization: &Organization,
        owner: &Membership,
    ) -> Result<(), TenancyPersistenceError>;

    /// Return `true` when an organization already uses `slug`.
    async fn slug_exists(&self, slug: &Slug) -> Result<bool, TenancyPersistenceError>;

    /// Organizations the user belongs to, oldest first.
    async fn organizations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, TenancyPersistenceError>;

    /// Role of `user_id` in `organization_id`, if a member.
    async fn member_role(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<MemberRole>, TenancyPersistenceError>;

    /// Sites owned by the organization, oldest first.
    async fn sites_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, TenancyPersistenceError>;

    /// Insert a site.
    async fn insert_site(&self, site: &Site) -> Result<(), TenancyPersistenceError>;
}
