//! HTTP inbound adapter exposing the dashboard REST endpoints.

pub mod auth;
pub mod bootstrap;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod organizations;
pub mod selection;
pub mod session;
pub mod session_config;
pub mod sites;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
