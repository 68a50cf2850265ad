//! Tests for the active selection.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rstest::rstest;
use tokio::sync::Notify;

use super::*;
use crate::domain::{OrganizationName, SiteName, SiteUrl, Slug};

#[derive(Default)]
struct CellStore {
    values: RefCell<HashMap<String, String>>,
}

impl CellStore {
    fn with(entries: &[(&str, String)]) -> Self {
        let store = Self::default();
        for (key, value) in entries {
            store
                .values
                .borrow_mut()
                .insert((*key).to_owned(), value.clone());
        }
        store
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl SelectionStore for &CellStore {
    fn read(&self, key: &str) -> Result<Option<String>, SelectionStoreError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SelectionStoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SelectionStoreError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

/// Tenancy query serving fixed site lists, optionally holding one
/// organization's response until released.
#[derive(Default)]
struct StubTenancy {
    sites: Mutex<HashMap<OrganizationId, Vec<Site>>>,
    gates: Mutex<HashMap<OrganizationId, Arc<Notify>>>,
    failing: Mutex<Vec<OrganizationId>>,
}

impl StubTenancy {
    fn serve(&self, organization_id: OrganizationId, sites: Vec<Site>) {
        self.sites
            .lock()
            .expect("sites lock")
            .insert(organization_id, sites);
    }

    fn gate(&self, organization_id: OrganizationId) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .expect("gates lock")
            .insert(organization_id, Arc::clone(&notify));
        notify
    }

    fn fail(&self, organization_id: OrganizationId) {
        self.failing
            .lock()
            .expect("failing lock")
            .push(organization_id);
    }
}

#[async_trait]
impl TenancyQuery for StubTenancy {
    async fn organizations(&self, _actor: &UserId) -> Result<Vec<Organization>, Error> {
        Ok(Vec::new())
    }

    async fn sites(
        &self,
        _actor: &UserId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Site>, Error> {
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .get(organization_id)
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self
            .failing
            .lock()
            .expect("failing lock")
            .contains(organization_id)
        {
            return Err(Error::service_unavailable("db down"));
        }
        Ok(self
            .sites
            .lock()
            .expect("sites lock")
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn slug_available(&self, _slug: &Slug) -> Result<bool, Error> {
        Ok(true)
    }
}

fn organization(name: &str) -> Organization {
    Organization {
        id: OrganizationId::random(),
        name: OrganizationName::new(name).expect("name"),
        slug: Slug::from_name(name).expect("slug"),
        logo: None,
        created_at: Utc::now(),
    }
}

fn site(organization_id: OrganizationId, name: &str) -> Site {
    Site {
        id: SiteId::random(),
        organization_id,
        name: SiteName::new(name).expect("name"),
        url: SiteUrl::new("https://blog.example.com").expect("url"),
        created_at: Utc::now(),
    }
}

struct World {
    tenancy: Arc<StubTenancy>,
    organizations: Vec<Organization>,
    alpha: Organization,
    beta: Organization,
    alpha_sites: Vec<Site>,
    beta_sites: Vec<Site>,
}

fn world() -> World {
    let alpha = organization("Alpha");
    let beta = organization("Beta");
    let alpha_sites = vec![site(alpha.id, "Alpha One"), site(alpha.id, "Alpha Two")];
    let beta_sites = vec![site(beta.id, "Beta One")];
    let tenancy = Arc::new(StubTenancy::default());
    tenancy.serve(alpha.id, alpha_sites.clone());
    tenancy.serve(beta.id, beta_sites.clone());
    World {
        tenancy,
        organizations: vec![alpha.clone(), beta.clone()],
        alpha,
        beta,
        alpha_sites,
        beta_sites,
    }
}

async fn restore<'a>(world: &World, store: &'a CellStore) -> ActiveSelection<&'a CellStore> {
    ActiveSelection::restore(
        store,
        world.tenancy.clone(),
        UserId::random(),
        world.organizations.clone(),
    )
    .await
    .expect("restore succeeds")
}

#[rstest]
fn first_of_defaults_to_first_elements() {
    let world = world();
    let snapshot =
        SelectionSnapshot::first_of(world.organizations.clone(), world.alpha_sites.clone());
    assert_eq!(snapshot.active_organization, Some(world.alpha));
    assert_eq!(snapshot.active_site, world.alpha_sites.first().cloned());
}

#[rstest]
fn first_of_handles_empty_lists() {
    let snapshot = SelectionSnapshot::first_of(Vec::new(), Vec::new());
    assert!(snapshot.active_organization.is_none());
    assert!(snapshot.active_site.is_none());
}

#[rstest]
#[tokio::test]
async fn restore_prefers_stored_ids() {
    let world = world();
    let second_site = world.alpha_sites.get(1).cloned().expect("second site");
    let store = CellStore::with(&[
        (ACTIVE_ORGANIZATION_KEY, world.alpha.id.to_string()),
        (ACTIVE_SITE_KEY, second_site.id.to_string()),
    ]);

    let selection = restore(&world, &store).await;

    let snapshot = selection.get();
    assert_eq!(snapshot.active_organization, Some(world.alpha.clone()));
    assert_eq!(snapshot.active_site, Some(second_site));
}

#[rstest]
#[tokio::test]
async fn restore_falls_back_and_reconciles_stale_ids() {
    let world = world();
    let store = CellStore::with(&[
        (ACTIVE_ORGANIZATION_KEY, OrganizationId::random().to_string()),
        (ACTIVE_SITE_KEY, "not-a-site".to_owned()),
    ]);

    let selection = restore(&world, &store).await;

    let snapshot = selection.get();
    let first_site = world.alpha_sites.first().cloned().expect("first site");
    assert_eq!(snapshot.active_organization, Some(world.alpha.clone()));
    assert_eq!(snapshot.active_site.as_ref(), Some(&first_site));
    assert_eq!(store.get(ACTIVE_ORGANIZATION_KEY), Some(world.alpha.id.to_string()));
    assert_eq!(store.get(ACTIVE_SITE_KEY), Some(first_site.id.to_string()));
}

#[rstest]
#[tokio::test]
async fn restore_rejects_site_from_another_organization() {
    let world = world();
    let foreign = world.beta_sites.first().cloned().expect("beta site");
    let store = CellStore::with(&[
        (ACTIVE_ORGANIZATION_KEY, world.alpha.id.to_string()),
        (ACTIVE_SITE_KEY, foreign.id.to_string()),
    ]);

    let selection = restore(&world, &store).await;

    assert_eq!(selection.get().active_site, world.alpha_sites.first().cloned());
}

#[rstest]
#[tokio::test]
async fn restore_clears_keys_without_organizations() {
    let store = CellStore::with(&[(ACTIVE_SITE_KEY, SiteId::random().to_string())]);
    let selection = ActiveSelection::restore(
        &store,
        Arc::new(StubTenancy::default()),
        UserId::random(),
        Vec::new(),
    )
    .await
    .expect("restore succeeds");

    assert_eq!(selection.get(), SelectionSnapshot::default());
    assert!(store.get(ACTIVE_SITE_KEY).is_none());
    assert!(store.get(ACTIVE_ORGANIZATION_KEY).is_none());
}

#[rstest]
#[tokio::test]
async fn switching_organization_resets_site_and_persists() {
    let world = world();
    let store = CellStore::default();
    let selection = restore(&world, &store).await;
    let mut updates = selection.subscribe();

    let outcome = selection
        .set(SelectionChange::Organization(world.beta.id))
        .await
        .expect("switch succeeds");

    let beta_site = world.beta_sites.first().cloned().expect("beta site");
    let SelectionOutcome::Applied(snapshot) = outcome else {
        panic!("switch should apply");
    };
    assert_eq!(snapshot.active_organization, Some(world.beta.clone()));
    assert_eq!(snapshot.active_site.as_ref(), Some(&beta_site));
    assert!(!snapshot.pending);
    assert_eq!(store.get(ACTIVE_ORGANIZATION_KEY), Some(world.beta.id.to_string()));
    assert_eq!(store.get(ACTIVE_SITE_KEY), Some(beta_site.id.to_string()));
    assert!(updates.has_changed().expect("sender alive"));
    assert_eq!(*updates.borrow_and_update(), snapshot);
}

#[rstest]
#[tokio::test]
async fn switching_to_unknown_organization_is_not_found() {
    let world = world();
    let store = CellStore::default();
    let selection = restore(&world, &store).await;

    let err = selection
        .set(SelectionChange::Organization(OrganizationId::random()))
        .await
        .expect_err("unknown organization");
    assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);
    assert_eq!(store.get(ACTIVE_ORGANIZATION_KEY), Some(world.alpha.id.to_string()));
}

#[rstest]
#[tokio::test]
async fn site_lookup_failure_leaves_no_site_selected() {
    let world = world();
    world.tenancy.fail(world.beta.id);
    let store = CellStore::default();
    let selection = restore(&world, &store).await;

    let outcome = selection
        .set(SelectionChange::Organization(world.beta.id))
        .await
        .expect("switch still applies");

    let SelectionOutcome::Applied(snapshot) = outcome else {
        panic!("switch should apply");
    };
    assert!(snapshot.sites.is_empty());
    assert!(snapshot.active_site.is_none());
    assert!(store.get(ACTIVE_SITE_KEY).is_none());
}

#[rstest]
#[tokio::test]
async fn site_switch_must_stay_within_the_organization() {
    let world = world();
    let store = CellStore::default();
    let selection = restore(&world, &store).await;
    let foreign = world.beta_sites.first().cloned().expect("beta site");

    let err = selection
        .set(SelectionChange::Site(foreign.id))
        .await
        .expect_err("foreign site rejected");
    assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);

    let second = world.alpha_sites.get(1).cloned().expect("second site");
    selection
        .set(SelectionChange::Site(second.id.clone()))
        .await
        .expect("own site accepted");
    assert_eq!(store.get(ACTIVE_SITE_KEY), Some(second.id.to_string()));
}

#[rstest]
#[tokio::test]
async fn superseded_switch_never_overwrites_newer_selection() {
    let world = world();
    let gamma = organization("Gamma");
    let gamma_sites = vec![site(gamma.id, "Gamma One")];
    world.tenancy.serve(gamma.id, gamma_sites.clone());
    let beta_gate = world.tenancy.gate(world.beta.id);
    let mut organizations = world.organizations.clone();
    organizations.push(gamma.clone());
    let store = CellStore::default();
    let selection = ActiveSelection::restore(
        &store,
        world.tenancy.clone(),
        UserId::random(),
        organizations,
    )
    .await
    .expect("restore succeeds");

    let slow = selection.set(SelectionChange::Organization(world.beta.id));
    let fast = async {
        // Let the slow switch reach its site fetch before switching again.
        tokio::task::yield_now().await;
        let outcome = selection
            .set(SelectionChange::Organization(gamma.id))
            .await;
        beta_gate.notify_one();
        outcome
    };
    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

    assert_eq!(slow_outcome.expect("slow switch"), SelectionOutcome::Superseded);
    assert!(matches!(fast_outcome, Ok(SelectionOutcome::Applied(_))));
    let snapshot = selection.get();
    assert_eq!(snapshot.active_organization, Some(gamma.clone()));
    assert_eq!(snapshot.active_site, gamma_sites.first().cloned());
    assert_eq!(store.get(ACTIVE_ORGANIZATION_KEY), Some(gamma.id.to_string()));
    assert_eq!(
        store.get(ACTIVE_SITE_KEY),
        gamma_sites.first().map(|s| s.id.to_string())
    );
}

#[rstest]
#[tokio::test]
async fn pending_switch_publishes_empty_site_list_first() {
    let world = world();
    let beta_gate = world.tenancy.gate(world.beta.id);
    let store = CellStore::default();
    let selection = restore(&world, &store).await;
    let mut updates = selection.subscribe();

    let switch = selection.set(SelectionChange::Organization(world.beta.id));
    let observe = async {
        updates.changed().await.expect("pending snapshot");
        let pending = updates.borrow_and_update().clone();
        assert!(store.get(ACTIVE_SITE_KEY).is_none());
        let err = selection
            .set(SelectionChange::Site(
                world.alpha_sites.first().map(|s| s.id.clone()).expect("site"),
            ))
            .await
            .expect_err("stale site rejected while pending");
        beta_gate.notify_one();
        (pending, err)
    };
    let (outcome, (pending, err)) = tokio::join!(switch, observe);

    assert!(pending.pending);
    assert!(pending.sites.is_empty());
    assert_eq!(err.code(), crate::domain::ErrorCode::NotFound);
    assert!(matches!(outcome, Ok(SelectionOutcome::Applied(_))));
}
