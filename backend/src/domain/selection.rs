//! Active organization and site selection.
//!
//! Two renditions exist. [`SelectionSnapshot::first_of`] is the stateless
//! form: the first organization and first site win. [`ActiveSelection`]
//! persists the chosen ids through a [`SelectionStore`], restores them on the
//! next visit and publishes every change to subscribers.
//!
//! The stored site id always belongs to the stored organization or is absent.
//! Switching organization removes the stored site id before the new site list
//! is fetched, and a fetch that completes after a newer switch is discarded.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    ACTIVE_ORGANIZATION_KEY, ACTIVE_SITE_KEY, SelectionStore, SelectionStoreError, TenancyQuery,
};
use crate::domain::{Error, Organization, OrganizationId, Site, SiteId, UserId};

/// Current selection as shown by the dashboard shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Organizations the user belongs to.
    pub organizations: Vec<Organization>,
    /// Selected organization.
    pub active_organization: Option<Organization>,
    /// Sites of the selected organization.
    pub sites: Vec<Site>,
    /// Selected site.
    pub active_site: Option<Site>,
    /// `true` while the sites of a newly selected organization are loading.
    pub pending: bool,
}

impl SelectionSnapshot {
    /// Stateless selection defaulting to the first element of each list.
    #[must_use]
    pub fn first_of(organizations: Vec<Organization>, sites: Vec<Site>) -> Self {
        let active_organization = organizations.first().cloned();
        let active_site = sites.first().cloned();
        Self {
            organizations,
            active_organization,
            sites,
            active_site,
            pending: false,
        }
    }
}

/// Requested selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Switch organization; the site resets to the new organization's first.
    Organization(OrganizationId),
    /// Switch site within the current organization.
    Site(SiteId),
}

/// Result of applying a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The change took effect.
    Applied(SelectionSnapshot),
    /// A newer change was made while this one was loading; its result was
    /// discarded.
    Superseded,
}

fn map_store_error(error: SelectionStoreError) -> Error {
    Error::internal(error.to_string())
}

fn read_id<T: FromStr>(store: &impl SelectionStore, key: &str) -> Option<T> {
    match store.read(key) {
        Ok(value) => value.and_then(|raw| raw.parse().ok()),
        Err(error) => {
            warn!(%error, key, "selection store read failed");
            None
        }
    }
}

/// Persisted, observable selection for one user.
pub struct ActiveSelection<S> {
    store: S,
    tenancy: Arc<dyn TenancyQuery>,
    actor: UserId,
    generation: AtomicU64,
    state: watch::Sender<SelectionSnapshot>,
}

impl<S: SelectionStore> ActiveSelection<S> {
    /// Restore the selection from `store`.
    ///
    /// Stored ids that no longer match the lists fall back to the first
    /// element, and the store is rewritten with the resolved ids.
    pub async fn restore(
        store: S,
        tenancy: Arc<dyn TenancyQuery>,
        actor: UserId,
        organizations: Vec<Organization>,
    ) -> Result<Self, Error> {
        let stored_organization: Option<OrganizationId> =
            read_id(&store, ACTIVE_ORGANIZATION_KEY);
        let active_organization = stored_organization
            .and_then(|id| organizations.iter().find(|org| org.id == id))
            .or_else(|| organizations.first())
            .cloned();

        let sites = match &active_organization {
            Some(organization) => {
                fetch_sites(tenancy.as_ref(), &actor, &organization.id).await
            }
            None => Vec::new(),
        };
        let stored_site: Option<SiteId> = read_id(&store, ACTIVE_SITE_KEY);
        let active_site = stored_site
            .and_then(|id| sites.iter().find(|site| site.id == id))
            .or_else(|| sites.first())
            .cloned();

        match &active_organization {
            Some(organization) => store
                .write(ACTIVE_ORGANIZATION_KEY, &organization.id.to_string())
                .map_err(map_store_error)?,
            None => store
                .remove(ACTIVE_ORGANIZATION_KEY)
                .map_err(map_store_error)?,
        }
        persist_site(&store, active_site.as_ref())?;

        let snapshot = SelectionSnapshot {
            organizations,
            active_organization,
            sites,
            active_site,
            pending: false,
        };
        let (state, _) = watch::channel(snapshot);
        Ok(Self {
            store,
            tenancy,
            actor,
            generation: AtomicU64::new(0),
            state,
        })
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> SelectionSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.state.subscribe()
    }

    /// Apply a selection change.
    pub async fn set(&self, change: SelectionChange) -> Result<SelectionOutcome, Error> {
        match change {
            SelectionChange::Organization(id) => self.select_organization(id).await,
            SelectionChange::Site(id) => self.select_site(&id),
        }
    }

    async fn select_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<SelectionOutcome, Error> {
        let current = self.get();
        let organization = current
            .organizations
            .iter()
            .find(|org| org.id == organization_id)
            .cloned()
            .ok_or_else(|| Error::not_found("organization not found"))?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.store
            .write(ACTIVE_ORGANIZATION_KEY, &organization_id.to_string())
            .map_err(map_store_error)?;
        self.store
            .remove(ACTIVE_SITE_KEY)
            .map_err(map_store_error)?;
        self.state.send_replace(SelectionSnapshot {
            organizations: current.organizations.clone(),
            active_organization: Some(organization.clone()),
            sites: Vec::new(),
            active_site: None,
            pending: true,
        });

        let sites = fetch_sites(self.tenancy.as_ref(), &self.actor, &organization_id).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(%organization_id, "discarding superseded site list");
            return Ok(SelectionOutcome::Superseded);
        }

        let active_site = sites.first().cloned();
        persist_site(&self.store, active_site.as_ref())?;
        let snapshot = SelectionSnapshot {
            organizations: current.organizations,
            active_organization: Some(organization),
            sites,
            active_site,
            pending: false,
        };
        self.state.send_replace(snapshot.clone());
        Ok(SelectionOutcome::Applied(snapshot))
    }

    fn select_site(&self, site_id: &SiteId) -> Result<SelectionOutcome, Error> {
        let mut snapshot = self.get();
        let site = snapshot
            .sites
            .iter()
            .find(|site| &site.id == site_id)
            .cloned()
            .ok_or_else(|| Error::not_found("site not found"))?;
        self.store
            .write(ACTIVE_SITE_KEY, site.id.as_ref())
            .map_err(map_store_error)?;
        snapshot.active_site = Some(site);
        self.state.send_replace(snapshot.clone());
        Ok(SelectionOutcome::Applied(snapshot))
    }
}

fn persist_site(store: &impl SelectionStore, site: Option<&Site>) -> Result<(), Error> {
    match site {
        Some(site) => store.write(ACTIVE_SITE_KEY, site.id.as_ref()),
        None => store.remove(ACTIVE_SITE_KEY),
    }
    .map_err(map_store_error)
}

async fn fetch_sites(
    tenancy: &dyn TenancyQuery,
    actor: &UserId,
    organization_id: &OrganizationId,
) -> Vec<Site> {
    tenancy
        .sites(actor, organization_id)
        .await
        .unwrap_or_else(|error| {
            warn!(%error, %organization_id, "site lookup failed; showing no sites");
            Vec::new()
        })
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
