//! Endpoint orchestration shared by handlers.

pub mod auth;
pub mod bodies;
