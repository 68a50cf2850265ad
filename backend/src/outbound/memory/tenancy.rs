//! Mutex-guarded organization, membership and site store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{TenancyPersistenceError, TenancyRepository};
use crate::domain::{Membership, MemberRole, Organization, OrganizationId, Site, Slug, UserId};

#[derive(Default)]
struct TenancyState {
    organizations: Vec<Organization>,
    members: Vec<Membership>,
    sites: Vec<Site>,
}

/// [`TenancyRepository`] keeping tenants in memory.
///
/// Lists come back in insertion order, matching the creation-time ordering of
/// the PostgreSQL adapter.
#[derive(Default)]
pub struct InMemoryTenancyRepository {
    state: Mutex<TenancyState>,
}

impl InMemoryTenancyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, TenancyState>, TenancyPersistenceError> {
        self.state
            .lock()
            .map_err(|_| TenancyPersistenceError::query("tenancy store lock poisoned"))
    }

    /// Add a membership directly, bypassing organization creation.
    pub fn add_member(&self, membership: Membership) -> Result<(), TenancyPersistenceError> {
        let mut state = self.lock()?;
        let exists = state.members.iter().any(|member| {
            member.organization_id == membership.organization_id
                && member.user_id == membership.user_id
        });
        if exists {
            return Err(TenancyPersistenceError::query("membership already exists"));
        }
        state.members.push(membership);
        Ok(())
    }

    /// Number of memberships held across all organizations.
    pub fn membership_count(&self) -> Result<usize, TenancyPersistenceError> {
        Ok(self.lock()?.members.len())
    }

    /// Number of sites across all organizations.
    pub fn site_count(&self) -> Result<usize, TenancyPersistenceError> {
        Ok(self.lock()?.sites.len())
    }
}

#[async_trait]
impl TenancyRepository for InMemoryTenancyRepository {
    async fn create_organization(
        &self,
        organization: &Organization,
        owner: &Membership,
    ) -> Result<(), TenancyPersistenceError> {
        let mut state = self.lock()?;
        if state
            .organizations
            .iter()
            .any(|existing| existing.slug == organization.slug)
        {
            return Err(TenancyPersistenceError::duplicate_slug(
                organization.slug.as_ref(),
            ));
        }
        state.organizations.push(organization.clone());
        state.members.push(owner.clone());
        Ok(())
    }

    async fn slug_exists(&self, slug: &Slug) -> Result<bool, TenancyPersistenceError> {
        Ok(self
            .lock()?
            .organizations
            .iter()
            .any(|organization| &organization.slug == slug))
    }

    async fn organizations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, TenancyPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .members
            .iter()
            .filter(|member| &member.user_id == user_id)
            .filter_map(|member| {
                state
                    .organizations
                    .iter()
                    .find(|organization| organization.id == member.organization_id)
                    .cloned()
            })
            .collect())
    }

    async fn member_role(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<MemberRole>, TenancyPersistenceError> {
        Ok(self
            .lock()?
            .members
            .iter()
            .find(|member| &member.organization_id == organization_id && &member.user_id == user_id)
            .map(|member| member.role))
    }

    async fn sites_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, TenancyPersistenceError> {
        Ok(self
            .lock()?
            .sites
            .iter()
            .filter(|site| &site.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn insert_site(&self, site: &Site) -> Result<(), TenancyPersistenceError> {
        let mut state = self.lock()?;
        if !state
            .organizations
            .iter()
            .any(|organization| organization.id == site.organization_id)
        {
            return Err(TenancyPersistenceError::query("organization does not exist"));
        }
        state.sites.push(site.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrganizationName, SiteId, SiteName, SiteUrl};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn organization(name: &str) -> Organization {
        Organization {
            id: OrganizationId::random(),
            name: OrganizationName::new(name).expect("name"),
            slug: Slug::from_name(name).expect("slug"),
            logo: None,
            created_at: Utc::now(),
        }
    }

    fn owner(organization: &Organization, user: &UserId) -> Membership {
        Membership {
            organization_id: organization.id,
            user_id: user.clone(),
            role: MemberRole::Owner,
            created_at: Utc::now(),
        }
    }

    fn site(organization: &Organization, name: &str) -> Site {
        Site {
            id: SiteId::random(),
            organization_id: organization.id,
            name: SiteName::new(name).expect("name"),
            url: SiteUrl::new("https://blog.example.com").expect("url"),
            created_at: Utc::now(),
        }
    }

    #[fixture]
    fn repo() -> InMemoryTenancyRepository {
        InMemoryTenancyRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn owners_see_their_organizations_in_creation_order(repo: InMemoryTenancyRepository) {
        let user = UserId::random();
        let first = organization("Acme");
        let second = organization("Globex");
        repo.create_organization(&first, &owner(&first, &user))
            .await
            .expect("create");
        repo.create_organization(&second, &owner(&second, &user))
            .await
            .expect("create");

        let listed = repo.organizations_for_user(&user).await.expect("list");
        assert_eq!(listed, vec![first.clone(), second]);
        assert_eq!(
            repo.member_role(&first.id, &user).await.expect("role"),
            Some(MemberRole::Owner)
        );
        assert!(
            repo.organizations_for_user(&UserId::random())
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_slugs_leave_memberships_untouched(repo: InMemoryTenancyRepository) {
        let user = UserId::random();
        let original = organization("Acme");
        repo.create_organization(&original, &owner(&original, &user))
            .await
            .expect("create");

        let clash = organization("ACME");
        let err = repo
            .create_organization(&clash, &owner(&clash, &UserId::random()))
            .await
            .expect_err("duplicate slug");

        assert_eq!(err, TenancyPersistenceError::duplicate_slug("acme"));
        assert_eq!(repo.membership_count().expect("count"), 1);
        assert!(repo.slug_exists(&original.slug).await.expect("exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn sites_are_scoped_to_their_organization(repo: InMemoryTenancyRepository) {
        let user = UserId::random();
        let acme = organization("Acme");
        let globex = organization("Globex");
        for org in [&acme, &globex] {
            repo.create_organization(org, &owner(org, &user))
                .await
                .expect("create");
        }
        let blog = site(&acme, "Blog");
        repo.insert_site(&blog).await.expect("insert");

        assert_eq!(
            repo.sites_for_organization(&acme.id).await.expect("list"),
            vec![blog]
        );
        assert!(
            repo.sites_for_organization(&globex.id)
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sites_require_an_existing_organization(repo: InMemoryTenancyRepository) {
        let orphan = site(&organization("Ghost"), "Blog");
        let err = repo.insert_site(&orphan).await.expect_err("no organization");
        assert!(matches!(err, TenancyPersistenceError::Query { .. }));
        assert_eq!(repo.site_count().expect("count"), 0);
    }
}
