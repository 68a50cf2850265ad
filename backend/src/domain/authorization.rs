//! Organization membership guard.
//!
//! Every tenant-scoped read and write asks the guard first. Reads turn a
//! denial into an empty result; writes turn it into a `forbidden` error.

use std::sync::Arc;

use crate::domain::ports::TenancyRepository;
use crate::domain::tenancy_service::map_tenancy_error;
use crate::domain::{Error, MemberRole, OrganizationId, UserId};

/// Message returned when a write targets an organization the actor is not in.
pub const NOT_A_MEMBER_MESSAGE: &str = "not a member of this organization";

/// Outcome of a membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// The actor belongs to the organization with this role.
    Member(MemberRole),
    /// The actor does not belong to the organization.
    Denied,
}

/// Resolves whether an actor may act within an organization.
pub struct AuthorizationGuard<R> {
    repo: Arc<R>,
}

impl<R> Clone for AuthorizationGuard<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: TenancyRepository> AuthorizationGuard<R> {
    /// Create a guard over the tenancy repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Look up the actor's membership.
    pub async fn authorize(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Authorization, Error> {
        let role = self
            .repo
            .member_role(organization_id, actor)
            .await
            .map_err(map_tenancy_error)?;
        Ok(role.map_or(Authorization::Denied, Authorization::Member))
    }

    /// Require membership, mapping a denial to `forbidden`.
    pub async fn require_member(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<MemberRole, Error> {
        match self.authorize(actor, organization_id).await? {
            Authorization::Member(role) => Ok(role),
            Authorization::Denied => Err(Error::forbidden(NOT_A_MEMBER_MESSAGE)),
        }
    }
}
