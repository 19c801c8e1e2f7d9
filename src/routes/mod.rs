//! HTTP route handlers.

pub mod health;
pub mod login;
pub mod logout;
pub mod page;
pub mod proxy;
pub mod refresh;
pub mod register;
