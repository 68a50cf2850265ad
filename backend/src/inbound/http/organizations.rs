//! Organization endpoints.
//!
//! ```text
//! GET  /api/v1/organizations
//! POST /api/v1/organizations {"name":"Better Blog"}
//! POST /api/v1/organizations/check-slug {"slug":"better-blog"}
//! GET  /api/v1/organizations/{organizationId}/sites
//! ```
//!
//! The two list endpoints fail empty: a missing session, a non-member, a
//! malformed id or a storage error all yield `[]`, with the error logged.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::ports::CreateOrganizationRequest;
use crate::domain::{Error, Organization, OrganizationName, SLUG_TAKEN_MESSAGE, Site, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, organization_error, parse_organization_id, required, slug_error,
};

/// Body for `POST /api/v1/organizations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationBody {
    #[schema(example = "Better Blog")]
    pub name: Option<String>,
}

/// Body for `POST /api/v1/organizations/check-slug`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckSlugBody {
    #[schema(example = "better-blog")]
    pub slug: Option<String>,
}

/// Response of a successful slug check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlugStatus {
    pub status: bool,
}

/// Swallow a lookup failure into an empty list.
pub(crate) fn or_empty<T>(result: ApiResult<Vec<T>>, lookup: &'static str) -> Vec<T> {
    result.unwrap_or_else(|error| {
        warn!(%error, code = ?error.code(), lookup, "lookup failed; returning empty list");
        Vec::new()
    })
}

/// Organizations the signed-in user belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    responses(
        (status = 200, description = "Organizations, empty when signed out or on failure", body = [Organization])
    ),
    tags = ["organizations"],
    operation_id = "getUserOrgs"
)]
#[get("/organizations")]
pub async fn list_organizations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<Vec<Organization>> {
    let Some(actor) = session.user_id_or_none() else {
        return web::Json(Vec::new());
    };
    web::Json(or_empty(
        state.tenancy.organizations(&actor).await,
        "organizations",
    ))
}

/// Create an organization owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = CreateOrganizationBody,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Slug already taken", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "createOrganization"
)]
#[post("/organizations")]
pub async fn create_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrganizationBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let field = FieldName::new("name");
    let name = required(payload.into_inner().name, field)?;
    let name = OrganizationName::new(name).map_err(|err| organization_error(&err, field))?;

    let organization = state
        .tenancy_command
        .create_organization(&actor, CreateOrganizationRequest { name })
        .await?;
    Ok(HttpResponse::Created().json(organization))
}

/// Check whether a slug is still free.
#[utoipa::path(
    post,
    path = "/api/v1/organizations/check-slug",
    request_body = CheckSlugBody,
    responses(
        (status = 200, description = "Slug is available", body = SlugStatus),
        (status = 400, description = "Malformed slug", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Slug already taken", body = Error)
    ),
    tags = ["organizations"],
    operation_id = "checkSlug"
)]
#[post("/organizations/check-slug")]
pub async fn check_slug(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckSlugBody>,
) -> ApiResult<web::Json<SlugStatus>> {
    session.require_user_id()?;
    let field = FieldName::new("slug");
    let raw = required(payload.into_inner().slug, field)?;
    let slug = Slug::parse(raw).map_err(|err| slug_error(&err, field))?;

    if state.tenancy.slug_available(&slug).await? {
        Ok(web::Json(SlugStatus { status: true }))
    } else {
        Err(Error::conflict(SLUG_TAKEN_MESSAGE))
    }
}

/// Sites of an organization the signed-in user belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{organizationId}/sites",
    params(("organizationId" = String, Path, description = "Organization UUID")),
    responses(
        (status = 200, description = "Sites, empty when not a member or on failure", body = [Site])
    ),
    tags = ["organizations"],
    operation_id = "getOrgSites"
)]
#[get("/organizations/{organization_id}/sites")]
pub async fn list_organization_sites(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> web::Json<Vec<Site>> {
    let Some(actor) = session.user_id_or_none() else {
        return web::Json(Vec::new());
    };
    let organization_id = match parse_organization_id(&path, FieldName::new("organizationId")) {
        Ok(id) => id,
        Err(error) => {
            debug!(%error, "malformed organization id in path");
            return web::Json(Vec::new());
        }
    };
    web::Json(or_empty(
        state.tenancy.sites(&actor, &organization_id).await,
        "organization sites",
    ))
}
