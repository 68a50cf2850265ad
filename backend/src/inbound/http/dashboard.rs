//! Dashboard home.
//!
//! ```text
//! GET /api/v1/dashboard
//! ```

use actix_web::{get, web};

use crate::domain::{DashboardOverview, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::selection::restore_selection;
use crate::inbound::http::session::{LOGIN_REQUIRED_MESSAGE, SessionContext};
use crate::inbound::http::state::HttpState;

/// Greeting, first name and active site for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard overview", body = DashboardOverview),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard_overview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardOverview>> {
    let actor = session.require_user_id()?;
    let user = state
        .users
        .find_user(&actor)
        .await?
        .ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED_MESSAGE))?;
    let selection = restore_selection(&state, &session, actor).await?;
    Ok(web::Json(DashboardOverview::build(
        state.clock.as_ref(),
        &user,
        &selection.get(),
    )))
}
