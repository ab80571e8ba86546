//! Meditation Center Backend
//!
//! Stateless JWT authentication and role/permission authorization for the
//! meditation center booking API. Tokens are HS256-signed and carry the
//! account's role; the server keeps no session state, so every request is
//! authenticated from scratch off its Authorization header.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
