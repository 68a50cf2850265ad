//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod password_hasher;
mod selection_store;
mod tenancy_command;
mod tenancy_query;
mod tenancy_repository;
mod user_repository;
mod users_query;

pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordDigest, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use selection_store::MockSelectionStore;
pub use selection_store::{
    ACTIVE_ORGANIZATION_KEY, ACTIVE_SITE_KEY, SelectionStore, SelectionStoreError,
};
#[cfg(test)]
pub use tenancy_command::MockTenancyCommand;
pub use tenancy_command::{CreateOrganizationRequest, CreateSiteRequest, TenancyCommand};
#[cfg(test)]
pub use tenancy_query::MockTenancyQuery;
pub use tenancy_query::TenancyQuery;
#[cfg(test)]
pub use tenancy_repository::MockTenancyRepository;
pub use tenancy_repository::{TenancyPersistenceError, TenancyRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredAccount, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
