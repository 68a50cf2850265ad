//! OpenAPI documentation for the dashboard API.
//!
//! The generated document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump` for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    DashboardOverview, Error, ErrorCode, MemberRole, Organization, RouteTarget,
    SelectionSnapshot, Site, User,
};
use crate::inbound::http::auth::{SessionResponse, SignInBody, SignUpBody};
use crate::inbound::http::bootstrap::{BootstrapResponse, GateResponse};
use crate::inbound::http::organizations::{CheckSlugBody, CreateOrganizationBody, SlugStatus};
use crate::inbound::http::selection::{SelectOrganizationBody, SelectSiteBody};
use crate::inbound::http::sites::CreateSiteBody;

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/sign-up or /api/v1/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the dashboard API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Blog dashboard API",
        description = "Accounts, organizations, sites and dashboard navigation for a multi-tenant blogging service."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::get_session,
        crate::inbound::http::auth::sign_up,
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::bootstrap::bootstrap,
        crate::inbound::http::bootstrap::onboarding_gate,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::create_organization,
        crate::inbound::http::organizations::check_slug,
        crate::inbound::http::organizations::list_organization_sites,
        crate::inbound::http::sites::create_site,
        crate::inbound::http::selection::get_selection,
        crate::inbound::http::selection::select_organization,
        crate::inbound::http::selection::select_site,
        crate::inbound::http::dashboard::dashboard_overview,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Organization,
        MemberRole,
        Site,
        SelectionSnapshot,
        DashboardOverview,
        RouteTarget,
        SignUpBody,
        SignInBody,
        SessionResponse,
        CreateOrganizationBody,
        CheckSlugBody,
        SlugStatus,
        CreateSiteBody,
        SelectOrganizationBody,
        SelectSiteBody,
        BootstrapResponse,
        GateResponse,
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in and session lookup"),
        (name = "bootstrap", description = "Landing-page routing"),
        (name = "organizations", description = "Organizations and their sites"),
        (name = "sites", description = "Site creation"),
        (name = "selection", description = "Active organization and site"),
        (name = "dashboard", description = "Dashboard home"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
