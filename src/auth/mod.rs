//! Authentication Module
//! Mission: Stateless token auth with role/permission based access control

pub mod api;
pub mod authorize;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod principal;
pub mod user_store;

pub use api::AuthState;
pub use authorize::AccessRule;
pub use jwt::JwtCodec;
pub use middleware::authenticate;
pub use models::{Permission, Role};
pub use principal::Principal;
pub use user_store::UserStore;
