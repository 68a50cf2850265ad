//! Site creation.
//!
//! ```text
//! POST /api/v1/sites {"organizationId":"…","name":"Engineering","url":"https://blog.example.com"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateSiteRequest;
use crate::domain::{Error, Site, SiteName, SiteUrl};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_organization_id, required, site_error};

/// Body for `POST /api/v1/sites`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSiteBody {
    #[schema(format = Uuid)]
    pub organization_id: Option<String>,
    #[schema(example = "Engineering Blog")]
    pub name: Option<String>,
    #[schema(example = "https://blog.example.com")]
    pub url: Option<String>,
}

impl CreateSiteBody {
    fn into_request(self) -> Result<CreateSiteRequest, Error> {
        let organization_field = FieldName::new("organizationId");
        let name_field = FieldName::new("name");
        let url_field = FieldName::new("url");

        let organization_id = parse_organization_id(
            &required(self.organization_id, organization_field)?,
            organization_field,
        )?;
        let name = SiteName::new(required(self.name, name_field)?)
            .map_err(|err| site_error(&err, name_field))?;
        let url = SiteUrl::new(required(self.url, url_field)?)
            .map_err(|err| site_error(&err, url_field))?;
        Ok(CreateSiteRequest {
            organization_id,
            name,
            url,
        })
    }
}

/// Create a site in an organization the signed-in user belongs to.
#[utoipa::path(
    post,
    path = "/api/v1/sites",
    request_body = CreateSiteBody,
    responses(
        (status = 201, description = "Site created", body = Site),
        (status = 400, description = "Invalid field", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not a member of the organization", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["sites"],
    operation_id = "createSite"
)]
#[post("/sites")]
pub async fn create_site(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateSiteBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let request = payload.into_inner().into_request()?;
    let site = state.tenancy_command.create_site(&actor, request).await?;
    Ok(HttpResponse::Created().json(site))
}
