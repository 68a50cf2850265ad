//! Builds handler state from the configured storage.

use std::sync::Arc;

use mockable::DefaultClock;

use dashboard::domain::ports::{TenancyRepository, UserRepository};
use dashboard::domain::{AccountService, TenancyService};
use dashboard::inbound::http::state::HttpState;
use dashboard::outbound::memory::{InMemoryTenancyRepository, InMemoryUserRepository};
use dashboard::outbound::password::Argon2PasswordHasher;
use dashboard::outbound::persistence::{DieselTenancyRepository, DieselUserRepository};

use super::ServerConfig;

fn wire<U, T>(users: U, tenancy: T) -> HttpState
where
    U: UserRepository + 'static,
    T: TenancyRepository + 'static,
{
    let accounts = AccountService::new(Arc::new(users), Arc::new(Argon2PasswordHasher::new()));
    let tenancy = TenancyService::new(Arc::new(tenancy));
    HttpState::from_services(Arc::new(accounts), Arc::new(tenancy), Arc::new(DefaultClock))
}

/// Diesel repositories when a pool is configured, in-memory ones otherwise.
///
/// In-memory storage is lost on restart and is meant for local development.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => wire(
            DieselUserRepository::new(pool.clone()),
            DieselTenancyRepository::new(pool.clone()),
        ),
        None => wire(
            InMemoryUserRepository::new(),
            InMemoryTenancyRepository::new(),
        ),
    }
}
