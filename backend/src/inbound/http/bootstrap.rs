//! Landing-page routing endpoints.
//!
//! ```text
//! GET /api/v1/bootstrap
//! GET /api/v1/onboarding
//! ```
//!
//! Both always answer `200`; failures show up as a more restrictive target
//! with `degraded: true`.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BootstrapOutcome, GateDecision, Organization, RouteTarget, Site, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Bootstrap result rendered for the client.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResponse {
    pub target: RouteTarget,
    #[schema(example = "/")]
    pub location: String,
    /// Set when a lookup failed and the target was downgraded.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub organizations: Vec<Organization>,
    /// Sites of the first organization.
    pub sites: Vec<Site>,
}

impl From<BootstrapOutcome> for BootstrapResponse {
    fn from(outcome: BootstrapOutcome) -> Self {
        Self {
            target: outcome.target,
            location: outcome.target.location().to_owned(),
            degraded: outcome.degraded,
            user: outcome.user,
            organizations: outcome.organizations,
            sites: outcome.sites,
        }
    }
}

/// Onboarding page gate.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GateResponse {
    pub target: RouteTarget,
    #[schema(example = "/onboarding")]
    pub location: String,
    pub degraded: bool,
}

impl From<GateDecision> for GateResponse {
    fn from(decision: GateDecision) -> Self {
        Self {
            target: decision.target,
            location: decision.target.location().to_owned(),
            degraded: decision.degraded,
        }
    }
}

/// Decide where the visitor lands and preload the dashboard shell.
#[utoipa::path(
    get,
    path = "/api/v1/bootstrap",
    responses((status = 200, description = "Landing decision", body = BootstrapResponse)),
    tags = ["bootstrap"],
    operation_id = "bootstrap",
    security([])
)]
#[get("/bootstrap")]
pub async fn bootstrap(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<BootstrapResponse> {
    let actor = session.user_id_or_none();
    let outcome = state.bootstrap().resolve(actor.as_ref()).await;
    web::Json(outcome.into())
}

/// Decide whether the onboarding wizard should be shown.
#[utoipa::path(
    get,
    path = "/api/v1/onboarding",
    responses((status = 200, description = "Onboarding gate decision", body = GateResponse)),
    tags = ["bootstrap"],
    operation_id = "onboardingGate",
    security([])
)]
#[get("/onboarding")]
pub async fn onboarding_gate(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<GateResponse> {
    let actor = session.user_id_or_none();
    let decision = state.bootstrap().onboarding_gate(actor.as_ref()).await;
    web::Json(decision.into())
}
