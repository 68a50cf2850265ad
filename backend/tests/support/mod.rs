//! HTTP harness shared by the behaviour suites.
//!
//! Each request builds a fresh app over the same handler state and session
//! key, so cookies issued by one step stay valid in the next.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use serde_json::Value;

use dashboard::Trace;
use dashboard::domain::{AccountService, TenancyService};
use dashboard::inbound::http::auth::{get_session, sign_in, sign_out, sign_up};
use dashboard::inbound::http::bootstrap::{bootstrap, onboarding_gate};
use dashboard::inbound::http::dashboard::dashboard_overview;
use dashboard::inbound::http::organizations::{
    check_slug, create_organization, list_organization_sites, list_organizations,
};
use dashboard::inbound::http::selection::{get_selection, select_organization, select_site};
use dashboard::inbound::http::sites::create_site;
use dashboard::inbound::http::state::HttpState;
use dashboard::outbound::memory::{InMemoryTenancyRepository, InMemoryUserRepository};
use dashboard::outbound::password::Argon2PasswordHasher;

pub mod steps;

const SESSION_COOKIE: &str = "session";

/// Password used by every account the harness registers.
pub const PASSWORD: &str = "correct horse battery";

pub fn run_async<T>(future: impl Future<Output = T>) -> T {
    tokio::runtime::Runtime::new()
        .expect("runtime")
        .block_on(future)
}

/// Status and JSON body of one response.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: u16,
    pub body: Value,
}

/// Dashboard API over in-memory storage with one cookie jar per actor.
pub struct HttpWorld {
    state: HttpState,
    key: Key,
    pub tenancy: Arc<InMemoryTenancyRepository>,
    cookies: HashMap<String, Cookie<'static>>,
    pub last: Option<Snapshot>,
    /// Id of the most recent site created through [`HttpWorld::create_site`].
    pub created_site: Option<String>,
}

impl HttpWorld {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let tenancy = Arc::new(InMemoryTenancyRepository::new());
        let accounts = Arc::new(AccountService::new(
            users,
            Arc::new(Argon2PasswordHasher::new()),
        ));
        let tenancy_service = Arc::new(TenancyService::new(Arc::clone(&tenancy)));
        Self {
            state: HttpState::from_services(accounts, tenancy_service, Arc::new(DefaultClock)),
            key: Key::generate(),
            tenancy,
            cookies: HashMap::new(),
            last: None,
            created_site: None,
        }
    }

    /// Send `request` carrying `actor`'s cookie, if any, and record the reply.
    pub fn send(&mut self, actor: Option<&str>, request: actix_test::TestRequest) -> &Snapshot {
        let cookie = actor.and_then(|name| self.cookies.get(name).cloned());
        let state = self.state.clone();
        let key = self.key.clone();
        let (snapshot, issued) = run_async(async move {
            let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
                .cookie_name(SESSION_COOKIE.to_owned())
                .cookie_secure(false)
                .build();
            let app = actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .wrap(Trace)
                    .service(
                        web::scope("/api/v1")
                            .wrap(session)
                            .service(get_session)
                            .service(sign_up)
                            .service(sign_in)
                            .service(sign_out)
                            .service(bootstrap)
                            .service(onboarding_gate)
                            .service(check_slug)
                            .service(list_organizations)
                            .service(create_organization)
                            .service(list_organization_sites)
                            .service(create_site)
                            .service(get_selection)
                            .service(select_organization)
                            .service(select_site)
                            .service(dashboard_overview),
                    ),
            )
            .await;
            let request = match cookie {
                Some(cookie) => request.cookie(cookie),
                None => request,
            };
            let response = actix_test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let issued = response
                .response()
                .cookies()
                .find(|cookie| cookie.name() == SESSION_COOKIE)
                .map(Cookie::into_owned);
            let bytes = actix_test::read_body(response).await;
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (Snapshot { status, body }, issued)
        });
        if let (Some(name), Some(cookie)) = (actor, issued) {
            self.cookies.insert(name.to_owned(), cookie);
        }
        self.last.insert(snapshot)
    }

    pub fn get(&mut self, actor: Option<&str>, uri: &str) -> &Snapshot {
        self.send(actor, actix_test::TestRequest::get().uri(uri))
    }

    pub fn post(&mut self, actor: Option<&str>, uri: &str, body: Value) -> &Snapshot {
        self.send(actor, actix_test::TestRequest::post().uri(uri).set_json(body))
    }

    pub fn sign_up(&mut self, name: &str) -> &Snapshot {
        let email = format!("{}@example.com", name.to_lowercase());
        self.post(
            Some(name),
            "/api/v1/sign-up",
            serde_json::json!({ "name": name, "email": email, "password": PASSWORD }),
        )
    }

    pub fn last(&self) -> &Snapshot {
        self.last.as_ref().expect("a request was sent")
    }
}

/// Fresh harness for each scenario.
#[rstest::fixture]
pub fn world() -> HttpWorld {
    HttpWorld::new()
}

impl HttpWorld {
    /// Id of the first organization listed for `owner`.
    pub fn first_organization_of(&mut self, owner: &str) -> String {
        let listed = self.get(Some(owner), "/api/v1/organizations");
        listed.body[0]["id"]
            .as_str()
            .unwrap_or_else(|| panic!("{owner} has no organization"))
            .to_owned()
    }

    pub fn create_organization(&mut self, actor: &str, name: &str) -> &Snapshot {
        self.post(
            Some(actor),
            "/api/v1/organizations",
            serde_json::json!({ "name": name }),
        )
    }

    pub fn create_site(&mut self, actor: &str, owner: &str, url: &str) -> &Snapshot {
        let organization_id = self.first_organization_of(owner);
        let created = self.post(
            Some(actor),
            "/api/v1/sites",
            serde_json::json!({ "organizationId": organization_id, "name": "Blog", "url": url }),
        );
        let site_id = (created.status == 201)
            .then(|| created.body["id"].as_str().map(str::to_owned))
            .flatten();
        if site_id.is_some() {
            self.created_site = site_id;
        }
        self.last()
    }
}
