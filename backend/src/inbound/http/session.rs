//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the actix session so handlers deal with user ids
//! and selection storage instead of raw cookie keys.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::{SelectionStore, SelectionStoreError};
use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Message returned when an endpoint needs a signed-in user.
pub const LOGIN_REQUIRED_MESSAGE: &str = "login required";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id, rotating the session first.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id, if present and well formed.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(id.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Fetch the user id, treating session read failures as signed out.
    pub fn user_id_or_none(&self) -> Option<UserId> {
        self.user_id().unwrap_or_else(|error| {
            warn!(%error, "session unreadable; treating request as signed out");
            None
        })
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED_MESSAGE))
    }

    /// Drop every session value, including the active selection.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// Selection store backed by this session's cookie.
    pub fn selection_store(&self) -> SessionSelectionStore {
        SessionSelectionStore(self.0.clone())
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// [`SelectionStore`] writing into the encrypted session cookie.
pub struct SessionSelectionStore(Session);

impl SelectionStore for SessionSelectionStore {
    fn read(&self, key: &str) -> Result<Option<String>, SelectionStoreError> {
        self.0
            .get::<String>(key)
            .map_err(|error| SelectionStoreError::storage(error.to_string()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SelectionStoreError> {
        self.0
            .insert(key, value)
            .map_err(|error| SelectionStoreError::storage(error.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), SelectionStoreError> {
        self.0.remove(key);
        Ok(())
    }
}
