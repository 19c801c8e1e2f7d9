//! Gateway identity service: token claims and the auth endpoints.

pub mod client;
pub mod jwt;
