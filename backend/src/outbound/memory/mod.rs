//! In-process adapters for database-less runs and behaviour tests.
//!
//! State lives behind a `Mutex` and enforces the same uniqueness rules as the
//! PostgreSQL schema: one account per email, one organization per slug and
//! one membership per user and organization.

mod tenancy;
mod users;

pub use tenancy::InMemoryTenancyRepository;
pub use users::InMemoryUserRepository;
