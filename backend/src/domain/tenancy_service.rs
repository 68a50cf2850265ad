//! Organization and site services.
//!
//! Implements the tenancy driving ports on top of the tenancy repository.
//! Membership checks are delegated to [`AuthorizationGuard`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::authorization::{Authorization, AuthorizationGuard};
use crate::domain::ports::{
    CreateOrganizationRequest, CreateSiteRequest, TenancyCommand, TenancyPersistenceError,
    TenancyQuery, TenancyRepository,
};
use crate::domain::{
    Error, MemberRole, Membership, Organization, OrganizationId, Site, SiteId, Slug, UserId,
};

/// Message returned when an organization slug is already in use.
pub const SLUG_TAKEN_MESSAGE: &str = "organization slug is already taken";

/// Map repository failures onto domain errors.
pub(crate) fn map_tenancy_error(error: TenancyPersistenceError) -> Error {
    match error {
        TenancyPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("tenancy repository unavailable: {message}"))
        }
        TenancyPersistenceError::Query { message } => {
            Error::internal(format!("tenancy repository error: {message}"))
        }
        TenancyPersistenceError::DuplicateSlug { slug } => slug_taken(&slug),
    }
}

fn slug_taken(slug: &str) -> Error {
    Error::conflict(SLUG_TAKEN_MESSAGE).with_details(json!({
        "field": "slug",
        "code": "slug_taken",
        "slug": slug,
    }))
}

/// Tenancy service implementing [`TenancyQuery`] and [`TenancyCommand`].
pub struct TenancyService<R> {
    repo: Arc<R>,
    guard: AuthorizationGuard<R>,
}

impl<R> Clone for TenancyService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            guard: self.guard.clone(),
        }
    }
}

impl<R: TenancyRepository> TenancyService<R> {
    /// Create a service over the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        let guard = AuthorizationGuard::new(Arc::clone(&repo));
        Self { repo, guard }
    }
}

#[async_trait]
impl<R: TenancyRepository> TenancyQuery for TenancyService<R> {
    async fn organizations(&self, actor: &UserId) -> Result<Vec<Organization>, Error> {
        self.repo
            .organizations_for_user(actor)
            .await
            .map_err(map_tenancy_error)
    }

    async fn sites(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, Error> {
        match self.guard.authorize(actor, organization_id).await? {
            Authorization::Member(_) => self
                .repo
                .sites_for_organization(organization_id)
                .await
                .map_err(map_tenancy_error),
            Authorization::Denied => {
                debug!(%actor, %organization_id, "site listing denied for non-member");
                Ok(Vec::new())
            }
        }
    }

    async fn slug_available(&self, slug: &Slug) -> Result<bool, Error> {
        let taken = self
            .repo
            .slug_exists(slug)
            .await
            .map_err(map_tenancy_error)?;
        Ok(!taken)
    }
}

#[async_trait]
impl<R: TenancyRepository> TenancyCommand for TenancyService<R> {
    async fn create_organization(
        &self,
        actor: &UserId,
        request: CreateOrganizationRequest,
    ) -> Result<Organization, Error> {
        let slug = Slug::from_name(request.name.as_ref()).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "name",
                "code": "empty_slug",
            }))
        })?;

        if !self.slug_available(&slug).await? {
            return Err(slug_taken(slug.as_ref()));
        }

        let created_at = Utc::now();
        let organization = Organization {
            id: OrganizationId::random(),
            name: request.name,
            slug,
            logo: None,
            created_at,
        };
        let owner = Membership {
            organization_id: organization.id,
            user_id: actor.clone(),
            role: MemberRole::Owner,
            created_at,
        };
        self.repo
            .create_organization(&organization, &owner)
            .await
            .map_err(map_tenancy_error)?;

        info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            owner = %actor,
            "organization created"
        );
        Ok(organization)
    }

    async fn create_site(&self, actor: &UserId, request: CreateSiteRequest) -> Result<Site, Error> {
        let CreateSiteRequest {
            organization_id,
            name,
            url,
        } = request;
        self.guard.require_member(actor, &organization_id).await?;

        let site = Site {
            id: SiteId::random(),
            organization_id,
            name,
            url,
            created_at: Utc::now(),
        };
        self.repo.insert_site(&site).await.map_err(map_tenancy_error)?;

        info!(site_id = %site.id, %organization_id, "site created");
        Ok(site)
    }
}

#[cfg(test)]
#[path = "tenancy_service_tests.rs"]
mod tests;
