//! Driving port resolving the user behind a session.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for user lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return the user for `id`, or `None` when the account no longer exists.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error>;
}
