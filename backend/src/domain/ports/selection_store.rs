//! Port for the small key/value store backing the active selection.
//!
//! Implementations are synchronous: the HTTP adapter wraps the request
//! session, which is neither `Send` nor async.

use super::define_port_error;

/// Key holding the active organization id.
pub const ACTIVE_ORGANIZATION_KEY: &str = "active_organization_id";
/// Key holding the active site id.
pub const ACTIVE_SITE_KEY: &str = "active_site_id";

define_port_error! {
    /// Failures raised by selection stores.
    pub enum SelectionStoreError {
        /// Reading or writing the backing store failed.
        Storage { message: String } => "selection store failed: {message}",
    }
}

/// String-keyed storage for selection ids.
#[cfg_attr(test, mockall::automock)]
pub trait SelectionStore {
    /// Read the value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, SelectionStoreError>;

    /// Store `value` under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), SelectionStoreError>;

    /// Remove `key`.
    fn remove(&self, key: &str) -> Result<(), SelectionStoreError>;
}
