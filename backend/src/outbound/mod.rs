//! Outbound adapters implementing the driven ports.
//!
//! - `persistence`: PostgreSQL repositories over Diesel.
//! - `memory`: in-process repositories for tests and database-less runs.
//! - `password`: Argon2id password hashing.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod memory;
pub mod password;
pub mod persistence;
