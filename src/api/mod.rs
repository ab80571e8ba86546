//! API surface: router construction and domain route handlers.

pub mod routes;

pub use routes::router;
