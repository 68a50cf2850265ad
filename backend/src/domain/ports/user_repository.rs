//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::ports::PasswordDigest;
use crate::domain::{Email, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// A user together with their password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    /// Public profile.
    pub user: User,
    /// Argon2 PHC string.
    pub password: PasswordDigest,
}

/// Driven port for account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when taken.
    async fn insert(&self, account: &StoredAccount) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, including its digest, by email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredAccount>, UserPersistenceError>;
}
