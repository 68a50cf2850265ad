//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use actix_http::Request;
use mockable::DefaultClock;
use serde_json::json;
use std::sync::Arc;

use crate::domain::{AccountService, TenancyService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryTenancyRepository, InMemoryUserRepository};
use crate::outbound::password::Argon2PasswordHasher;

/// Name of the session cookie used by the server and tests.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag so
/// plain HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

/// In-memory adapters wired into handler state.
pub struct MemoryBackend {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub tenancy: Arc<InMemoryTenancyRepository>,
}

/// Build handler state over fresh in-memory repositories and a real Argon2
/// hasher.
pub fn memory_backend() -> MemoryBackend {
    let users = Arc::new(InMemoryUserRepository::new());
    let tenancy = Arc::new(InMemoryTenancyRepository::new());
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let tenancy_service = Arc::new(TenancyService::new(Arc::clone(&tenancy)));
    let state = HttpState::from_services(accounts, tenancy_service, Arc::new(DefaultClock));
    MemoryBackend {
        state,
        users,
        tenancy,
    }
}

/// Register an account through `POST /api/v1/sign-up` and return its cookie.
///
/// The app under test must mount [`super::auth::sign_up`].
pub async fn signed_up<S, B>(app: &S, name: &str, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/sign-up")
        .set_json(json!({ "name": name, "email": email, "password": "correct horse" }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED, "sign-up failed");
    session_cookie(&response).expect("sign-up sets the session cookie")
}
