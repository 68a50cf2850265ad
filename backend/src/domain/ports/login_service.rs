//! Driving port for email/password account flows.
//!
//! Inbound adapters call this port to register and authenticate users without
//! importing persistence or hashing adapters.

use async_trait::async_trait;

use crate::domain::{Error, SignInCredentials, SignUpRequest, User};

/// Domain use-case port for account registration and sign-in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Register a new account and return its public profile.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user.
    async fn sign_in(&self, credentials: &SignInCredentials) -> Result<User, Error>;
}
