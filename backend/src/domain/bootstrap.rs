//! Session and tenancy bootstrap.
//!
//! Decides where a visitor lands: the login page, the onboarding wizard, or
//! the dashboard with its first organization's sites preloaded. Every lookup
//! failure downgrades to the more restrictive destination.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::{TenancyQuery, UsersQuery};
use crate::domain::{Organization, Site, User, UserId};

/// Page a visitor is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteTarget {
    /// No authenticated session.
    Login,
    /// Authenticated, without any organization yet.
    Onboarding,
    /// Authenticated member of at least one organization.
    Dashboard,
}

impl RouteTarget {
    /// Path of the target page.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::RouteTarget;
    ///
    /// assert_eq!(RouteTarget::Onboarding.location(), "/onboarding");
    /// ```
    #[must_use]
    pub const fn location(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Onboarding => "/onboarding",
            Self::Dashboard => "/",
        }
    }
}

/// Pure routing decision.
///
/// # Examples
/// ```
/// use dashboard::domain::{RouteTarget, route_for};
///
/// assert_eq!(route_for(None, 3), RouteTarget::Login);
/// ```
#[must_use]
pub fn route_for(session: Option<&User>, organization_count: usize) -> RouteTarget {
    match (session, organization_count) {
        (None, _) => RouteTarget::Login,
        (Some(_), 0) => RouteTarget::Onboarding,
        (Some(_), _) => RouteTarget::Dashboard,
    }
}

/// Result of a full bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Where to send the visitor.
    pub target: RouteTarget,
    /// `true` when a lookup failed and the target may be more restrictive
    /// than the stored data warrants.
    pub degraded: bool,
    /// Session user, when resolved.
    pub user: Option<User>,
    /// The user's organizations.
    pub organizations: Vec<Organization>,
    /// Sites of the first organization.
    pub sites: Vec<Site>,
}

impl BootstrapOutcome {
    fn login(degraded: bool) -> Self {
        Self {
            target: RouteTarget::Login,
            degraded,
            user: None,
            organizations: Vec::new(),
            sites: Vec::new(),
        }
    }
}

/// Routing decision for the onboarding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    /// Where to send the visitor.
    pub target: RouteTarget,
    /// `true` when a lookup failed.
    pub degraded: bool,
}

/// Runs the ordered bootstrap lookups.
#[derive(Clone)]
pub struct BootstrapService {
    users: Arc<dyn UsersQuery>,
    tenancy: Arc<dyn TenancyQuery>,
}

impl BootstrapService {
    /// Create the service from the user and tenancy query ports.
    pub fn new(users: Arc<dyn UsersQuery>, tenancy: Arc<dyn TenancyQuery>) -> Self {
        Self { users, tenancy }
    }

    /// Resolve the landing page for `session_user`.
    pub async fn resolve(&self, session_user: Option<&UserId>) -> BootstrapOutcome {
        let (user, user_failed) = self.session_user(session_user).await;
        let Some(user) = user else {
            return BootstrapOutcome::login(user_failed);
        };

        let organizations = match self.tenancy.organizations(user.id()).await {
            Ok(organizations) => organizations,
            Err(error) => {
                warn!(%error, step = "organizations", "bootstrap lookup failed");
                return BootstrapOutcome {
                    target: RouteTarget::Onboarding,
                    degraded: true,
                    user: Some(user),
                    organizations: Vec::new(),
                    sites: Vec::new(),
                };
            }
        };

        let target = route_for(Some(&user), organizations.len());
        let mut degraded = false;
        let sites = match organizations.first() {
            Some(first) => match self.tenancy.sites(user.id(), &first.id).await {
                Ok(sites) => sites,
                Err(error) => {
                    warn!(%error, step = "sites", organization_id = %first.id, "bootstrap lookup failed");
                    degraded = true;
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        BootstrapOutcome {
            target,
            degraded,
            user: Some(user),
            organizations,
            sites,
        }
    }

    /// Decide whether the onboarding page should be shown.
    pub async fn onboarding_gate(&self, session_user: Option<&UserId>) -> GateDecision {
        let (user, user_failed) = self.session_user(session_user).await;
        let Some(user) = user else {
            return GateDecision {
                target: RouteTarget::Login,
                degraded: user_failed,
            };
        };
        match self.tenancy.organizations(user.id()).await {
            Ok(organizations) => GateDecision {
                target: route_for(Some(&user), organizations.len()),
                degraded: false,
            },
            Err(error) => {
                warn!(%error, step = "organizations", "onboarding gate lookup failed");
                GateDecision {
                    target: RouteTarget::Onboarding,
                    degraded: true,
                }
            }
        }
    }

    async fn session_user(&self, session_user: Option<&UserId>) -> (Option<User>, bool) {
        let Some(id) = session_user else {
            return (None, false);
        };
        match self.users.find_user(id).await {
            Ok(user) => (user, false),
            Err(error) => {
                warn!(%error, step = "session", "bootstrap lookup failed");
                (None, true)
            }
        }
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
