//! Active organization and site selection, persisted in the session cookie.
//!
//! ```text
//! GET /api/v1/selection
//! PUT /api/v1/selection/organization {"organizationId":"…"}
//! PUT /api/v1/selection/site {"siteId":"…"}
//! ```

use std::sync::Arc;

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ActiveSelection, Error, SelectionChange, SelectionOutcome, SelectionSnapshot, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::organizations::or_empty;
use crate::inbound::http::session::{SessionContext, SessionSelectionStore};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_organization_id, parse_site_id, required};

/// Body for `PUT /api/v1/selection/organization`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOrganizationBody {
    #[schema(format = Uuid)]
    pub organization_id: Option<String>,
}

/// Body for `PUT /api/v1/selection/site`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectSiteBody {
    #[schema(example = "V1StGXR8_Z5jdHi6B-myT")]
    pub site_id: Option<String>,
}

/// Restore the actor's selection from the session.
pub(crate) async fn restore_selection(
    state: &HttpState,
    session: &SessionContext,
    actor: UserId,
) -> ApiResult<ActiveSelection<SessionSelectionStore>> {
    let organizations = or_empty(state.tenancy.organizations(&actor).await, "organizations");
    ActiveSelection::restore(
        session.selection_store(),
        Arc::clone(&state.tenancy),
        actor,
        organizations,
    )
    .await
}

async fn apply(
    selection: &ActiveSelection<SessionSelectionStore>,
    change: SelectionChange,
) -> ApiResult<SelectionSnapshot> {
    match selection.set(change).await? {
        SelectionOutcome::Applied(snapshot) => Ok(snapshot),
        SelectionOutcome::Superseded => Ok(selection.get()),
    }
}

/// Current selection, restored from the session.
#[utoipa::path(
    get,
    path = "/api/v1/selection",
    responses(
        (status = 200, description = "Current selection", body = SelectionSnapshot),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["selection"],
    operation_id = "getSelection"
)]
#[get("/selection")]
pub async fn get_selection(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SelectionSnapshot>> {
    let actor = session.require_user_id()?;
    let selection = restore_selection(&state, &session, actor).await?;
    Ok(web::Json(selection.get()))
}

/// Switch organization; the site resets to the new organization's first.
#[utoipa::path(
    put,
    path = "/api/v1/selection/organization",
    request_body = SelectOrganizationBody,
    responses(
        (status = 200, description = "Updated selection", body = SelectionSnapshot),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Organization not in the user's list", body = Error)
    ),
    tags = ["selection"],
    operation_id = "selectOrganization"
)]
#[put("/selection/organization")]
pub async fn select_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SelectOrganizationBody>,
) -> ApiResult<web::Json<SelectionSnapshot>> {
    let actor = session.require_user_id()?;
    let field = FieldName::new("organizationId");
    let raw = required(payload.into_inner().organization_id, field)?;
    let organization_id = parse_organization_id(&raw, field)?;

    let selection = restore_selection(&state, &session, actor).await?;
    let snapshot = apply(&selection, SelectionChange::Organization(organization_id)).await?;
    Ok(web::Json(snapshot))
}

/// Switch site within the selected organization.
#[utoipa::path(
    put,
    path = "/api/v1/selection/site",
    request_body = SelectSiteBody,
    responses(
        (status = 200, description = "Updated selection", body = SelectionSnapshot),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Site not in the selected organization", body = Error)
    ),
    tags = ["selection"],
    operation_id = "selectSite"
)]
#[put("/selection/site")]
pub async fn select_site(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SelectSiteBody>,
) -> ApiResult<web::Json<SelectionSnapshot>> {
    let actor = session.require_user_id()?;
    let field = FieldName::new("siteId");
    let site_id = parse_site_id(required(payload.into_inner().site_id, field)?, field)?;

    let selection = restore_selection(&state, &session, actor).await?;
    let snapshot = apply(&selection, SelectionChange::Site(site_id)).await?;
    Ok(web::Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::auth::sign_up;
    use crate::inbound::http::organizations::create_organization;
    use crate::inbound::http::sites::create_site;
    use crate::inbound::http::test_utils::{
        memory_backend, session_cookie, signed_up, test_session_middleware,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    macro_rules! selection_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(memory_backend().state))
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(sign_up)
                            .service(create_organization)
                            .service(create_site)
                            .service(get_selection)
                            .service(select_organization)
                            .service(select_site),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn selection_requires_a_session() {
        let app = selection_app!();
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/selection").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn switching_organization_resets_the_site_and_persists() {
        let app = selection_app!();
        let cookie = signed_up(&app, "Ada", "ada@example.com").await;

        let mut organization_ids = Vec::new();
        for (name, site) in [("Acme", "https://acme.example.com"), ("Globex", "https://globex.example.com")] {
            let created = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/organizations")
                    .cookie(cookie.clone())
                    .set_json(json!({ "name": name }))
                    .to_request(),
            )
            .await;
            let organization: Value = test::read_body_json(created).await;
            let id = organization["id"].clone();
            let response = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/sites")
                    .cookie(cookie.clone())
                    .set_json(json!({ "organizationId": id, "name": "Blog", "url": site }))
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            organization_ids.push(id);
        }

        let initial = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/selection")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let initial_cookie = session_cookie(&initial).unwrap_or_else(|| cookie.clone());
        let body: Value = test::read_body_json(initial).await;
        assert_eq!(body["activeOrganization"]["id"], organization_ids[0]);
        assert_eq!(body["activeSite"]["url"], "https://acme.example.com");

        let switched = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/selection/organization")
                .cookie(initial_cookie)
                .set_json(json!({ "organizationId": organization_ids[1] }))
                .to_request(),
        )
        .await;
        assert_eq!(switched.status(), StatusCode::OK);
        let switched_cookie = session_cookie(&switched).expect("selection persisted");
        let body: Value = test::read_body_json(switched).await;
        assert_eq!(body["activeOrganization"]["id"], organization_ids[1]);
        assert_eq!(body["activeSite"]["url"], "https://globex.example.com");
        assert_eq!(body["pending"], false);

        let restored = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/selection")
                .cookie(switched_cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(restored).await;
        assert_eq!(body["activeOrganization"]["id"], organization_ids[1]);
        assert_eq!(body["activeSite"]["organizationId"], organization_ids[1]);
    }

    #[actix_web::test]
    async fn unknown_targets_are_not_found() {
        let app = selection_app!();
        let cookie = signed_up(&app, "Ada", "ada@example.com").await;

        let organization = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/selection/organization")
                .cookie(cookie.clone())
                .set_json(json!({ "organizationId": "3fa85f64-5717-4562-b3fc-2c963f66afa6" }))
                .to_request(),
        )
        .await;
        assert_eq!(organization.status(), StatusCode::NOT_FOUND);

        let site = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/selection/site")
                .cookie(cookie)
                .set_json(json!({ "siteId": "V1StGXR8_Z5jdHi6B-myT" }))
                .to_request(),
        )
        .await;
        assert_eq!(site.status(), StatusCode::NOT_FOUND);
    }
}
