//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` so they depend only on domain ports
//! and can be tested with in-memory or mocked implementations.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::BootstrapService;
use crate::domain::ports::{LoginService, TenancyCommand, TenancyQuery, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-up and sign-in.
    pub login: Arc<dyn LoginService>,
    /// Session user lookup.
    pub users: Arc<dyn UsersQuery>,
    /// Organization and site reads.
    pub tenancy: Arc<dyn TenancyQuery>,
    /// Organization and site writes.
    pub tenancy_command: Arc<dyn TenancyCommand>,
    /// Wall clock for the dashboard greeting.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Bundle the ports into handler state.
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UsersQuery>,
        tenancy: Arc<dyn TenancyQuery>,
        tenancy_command: Arc<dyn TenancyCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            login,
            users,
            tenancy,
            tenancy_command,
            clock,
        }
    }

    /// Wire one account service and one tenancy service into every port.
    pub fn from_services<A, T>(accounts: Arc<A>, tenancy: Arc<T>, clock: Arc<dyn Clock>) -> Self
    where
        A: LoginService + UsersQuery + 'static,
        T: TenancyQuery + TenancyCommand + 'static,
    {
        Self::new(
            Arc::clone(&accounts) as Arc<dyn LoginService>,
            accounts,
            Arc::clone(&tenancy) as Arc<dyn TenancyQuery>,
            tenancy,
            clock,
        )
    }

    /// Bootstrap service over this state's query ports.
    pub fn bootstrap(&self) -> BootstrapService {
        BootstrapService::new(Arc::clone(&self.users), Arc::clone(&self.tenancy))
    }
}
