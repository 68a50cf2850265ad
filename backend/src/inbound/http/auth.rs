//! Account and session endpoints.
//!
//! ```text
//! GET  /api/v1/session
//! POST /api/v1/sign-up {"name":"Ada Lovelace","email":"ada@example.com","password":"..."}
//! POST /api/v1/sign-in {"email":"ada@example.com","password":"..."}
//! POST /api/v1/sign-out
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{Error, SignInCredentials, SignUpRequest, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, account_error, required};

/// Body for `POST /api/v1/sign-up`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body for `POST /api/v1/sign-in`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInBody {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signed-in user wrapper returned by `GET /api/v1/session`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
}

/// Resolve the session user.
///
/// Returns `null` rather than an error when there is no session, the cookie
/// is unreadable or the user no longer exists.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Session user, or null when signed out", body = Option<SessionResponse>)
    ),
    tags = ["auth"],
    operation_id = "getUser",
    security([])
)]
#[get("/session")]
pub async fn get_session(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> web::Json<Option<SessionResponse>> {
    let Some(user_id) = session.user_id_or_none() else {
        return web::Json(None);
    };
    let user = match state.users.find_user(&user_id).await {
        Ok(user) => user,
        Err(error) => {
            warn!(%error, code = ?error.code(), "session user lookup failed");
            None
        }
    };
    web::Json(user.map(|user| SessionResponse { user }))
}

/// Register an email/password account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/sign-up",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/sign-up")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let SignUpBody {
        name,
        email,
        password,
    } = payload.into_inner();
    let name = required(name, FieldName::new("name"))?;
    let email = required(email, FieldName::new("email"))?;
    let password = Zeroizing::new(required(password, FieldName::new("password"))?);
    let request = SignUpRequest::try_from_parts(&name, &email, &password)
        .map_err(|err| account_error(&err))?;

    let user = state.login.sign_up(&request).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(user))
}

/// Check credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/sign-in",
    request_body = SignInBody,
    responses(
        (status = 200, description = "Signed in", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid email or password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInBody>,
) -> ApiResult<web::Json<User>> {
    let SignInBody { email, password } = payload.into_inner();
    let email = required(email, FieldName::new("email"))?;
    let password = Zeroizing::new(required(password, FieldName::new("password"))?);
    let credentials =
        SignInCredentials::try_from_parts(&email, &password).map_err(|err| account_error(&err))?;

    let user = state.login.sign_in(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user))
}

/// Drop the session, including the active selection.
#[utoipa::path(
    post,
    path = "/api/v1/sign-out",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/sign-out")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}
