//! PostgreSQL-backed `TenancyRepository`.
//!
//! Organization creation and the owner's membership share one transaction,
//! so a slug clash never leaves an orphaned membership behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TenancyPersistenceError, TenancyRepository};
use crate::domain::{
    Membership, MemberRole, Organization, OrganizationId, OrganizationName, Site, SiteId,
    SiteName, SiteUrl, Slug, UserId,
};

use super::error_mapping::{DieselFailure, classify};
use super::models::{NewMemberRow, NewOrganizationRow, NewSiteRow, OrganizationRow, SiteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{members, organizations, sites};

/// Diesel implementation of [`TenancyRepository`].
#[derive(Clone)]
pub struct DieselTenancyRepository {
    pool: DbPool,
}

impl DieselTenancyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TenancyPersistenceError {
    TenancyPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> TenancyPersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => TenancyPersistenceError::connection(message),
        DieselFailure::Query(message) => TenancyPersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => TenancyPersistenceError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
    }
}

/// Unique violations while creating an organization are slug clashes unless
/// the constraint says otherwise.
fn map_create_error(error: diesel::result::Error, slug: &Slug) -> TenancyPersistenceError {
    match classify(error) {
        DieselFailure::UniqueViolation { constraint }
            if constraint
                .as_deref()
                .is_none_or(|name| name.contains("slug")) =>
        {
            TenancyPersistenceError::duplicate_slug(slug.as_ref())
        }
        DieselFailure::UniqueViolation { constraint } => TenancyPersistenceError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DieselFailure::Connection(message) => TenancyPersistenceError::connection(message),
        DieselFailure::Query(message) => TenancyPersistenceError::query(message),
    }
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> TenancyPersistenceError {
    TenancyPersistenceError::query(format!("stored {what}: {err}"))
}

fn row_to_organization(row: OrganizationRow) -> Result<Organization, TenancyPersistenceError> {
    Ok(Organization {
        id: OrganizationId::from_uuid(row.id),
        name: OrganizationName::new(&row.name).map_err(|err| corrupt("organization name", err))?,
        slug: Slug::parse(row.slug).map_err(|err| corrupt("organization slug", err))?,
        logo: row.logo,
        created_at: row.created_at,
    })
}

fn row_to_site(row: SiteRow) -> Result<Site, TenancyPersistenceError> {
    Ok(Site {
        id: SiteId::parse(row.id).map_err(|err| corrupt("site id", err))?,
        organization_id: OrganizationId::from_uuid(row.organization_id),
        name: SiteName::new(&row.name).map_err(|err| corrupt("site name", err))?,
        url: SiteUrl::new(&row.url).map_err(|err| corrupt("site url", err))?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl TenancyRepository for DieselTenancyRepository {
    async fn create_organization(
        &self,
        organization: &Organization,
        owner: &Membership,
    ) -> Result<(), TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let organization_row = NewOrganizationRow {
            id: *organization.id.as_uuid(),
            name: organization.name.as_ref(),
            slug: organization.slug.as_ref(),
            logo: organization.logo.as_deref(),
            created_at: organization.created_at,
        };
        let member_row = NewMemberRow {
            id: Uuid::new_v4(),
            organization_id: *owner.organization_id.as_uuid(),
            user_id: *owner.user_id.as_uuid(),
            role: owner.role.as_str(),
            created_at: owner.created_at,
        };

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(organizations::table)
                    .values(&organization_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(members::table)
                    .values(&member_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_create_error(err, &organization.slug))
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool, TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            organizations::table.filter(organizations::slug.eq(slug.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn organizations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationRow> = organizations::table
            .inner_join(members::table)
            .filter(members::user_id.eq(user_id.as_uuid()))
            .order(members::created_at.asc())
            .select(OrganizationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_organization).collect()
    }

    async fn member_role(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<MemberRole>, TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let role: Option<String> = members::table
            .filter(members::organization_id.eq(organization_id.as_uuid()))
            .filter(members::user_id.eq(user_id.as_uuid()))
            .select(members::role)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        role.map(|raw| raw.parse().map_err(|err: String| corrupt("member role", err)))
            .transpose()
    }

    async fn sites_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SiteRow> = sites::table
            .filter(sites::organization_id.eq(organization_id.as_uuid()))
            .order(sites::created_at.asc())
            .select(SiteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_site).collect()
    }

    async fn insert_site(&self, site: &Site) -> Result<(), TenancyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSiteRow {
            id: site.id.as_ref(),
            organization_id: *site.organization_id.as_uuid(),
            name: site.name.as_ref(),
            url: site.url.as_ref(),
            created_at: site.created_at,
        };
        diesel::insert_into(sites::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
