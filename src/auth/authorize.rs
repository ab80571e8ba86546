//! Authorization Gate
//! Mission: Enforce declarative role/permission rules on protected routes
//!
//! A rule is a boolean combination of "has role" and "has permission"
//! checks, evaluated short-circuit left-to-right against the request's
//! principal. Rules have no side effects; a route without a principal fails
//! authentication (401), a principal failing the rule fails authorization
//! (403). The distinction matters for the response code.

use crate::auth::error::{forbidden_response, unauthorized_response};
use crate::auth::models::{Permission, Role};
use crate::auth::principal::Principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Declarative access rule attached to a protected route.
///
/// Attach with `axum::middleware::from_fn_with_state(rule, authorize::enforce)`
/// as a `route_layer`.
#[derive(Debug, Clone)]
pub enum AccessRule {
    /// Coarse check: principal holds exactly this role
    Role(Role),
    /// Fine-grained check: principal's role grants this permission
    Permission(Permission),
    /// True if any sub-rule is true (short-circuits)
    AnyOf(Vec<AccessRule>),
    /// True if all sub-rules are true (short-circuits)
    AllOf(Vec<AccessRule>),
}

impl AccessRule {
    pub fn evaluate(&self, principal: &Principal) -> bool {
        match self {
            AccessRule::Role(role) => principal.has_role(*role),
            AccessRule::Permission(permission) => principal.has_permission(*permission),
            AccessRule::AnyOf(rules) => rules.iter().any(|rule| rule.evaluate(principal)),
            AccessRule::AllOf(rules) => rules.iter().all(|rule| rule.evaluate(principal)),
        }
    }
}

/// Gate middleware. Reads the principal published by the authentication
/// pipeline and either passes the request through or translates the failure
/// into the fixed 401/403 response for this path.
pub async fn enforce(State(rule): State<AccessRule>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    match req.extensions().get::<Principal>() {
        None => {
            warn!(path, "rejected unauthenticated request to guarded route");
            unauthorized_response(&path)
        }
        Some(principal) if !rule.evaluate(principal) => {
            warn!(
                path,
                user_id = principal.user_id,
                role = principal.role.as_str(),
                "rejected request lacking required authority"
            );
            forbidden_response(&path)
        }
        Some(_) => next.run(req).await,
    }
}
