//! # stellar_core
//!
//! Core domain logic for Stellar.
//!
//! Owns the token service, account and revocation stores, the star/planet
//! document repository and the audit log. Every store is a trait with a
//! PostgreSQL implementation and an in-memory one; [`store::Stores`] wires a
//! full set together.

pub mod audit;
pub mod auth;
pub mod bodies;
pub mod db;
pub mod fields;
pub mod migrate;
pub mod models;
pub mod pagination;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
