//! Authentication Middleware
//! Mission: Turn a bearer token into a request-scoped principal
//!
//! Per-request state machine: NoToken -> TokenPresent -> {Valid, Invalid}
//! -> {Authenticated, Rejected}. The pipeline never terminates a request on
//! a bad token; it proceeds unauthenticated and leaves the access decision
//! to the authorization gate, so public endpoints stay reachable even with
//! a stale token attached.

use crate::auth::api::AuthState;
use crate::auth::jwt::TokenCheck;
use crate::auth::models::TokenType;
use crate::auth::principal::{assemble_principal, Principal};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
/// A missing header and a malformed prefix are treated identically.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|t| t.to_string())
}

/// Authentication pipeline stage, attached once around the whole router.
///
/// On success the principal is inserted into the request's extensions (set
/// at most once, dropped with the request). Every failure path continues
/// with an empty context; only the claims of a valid ACCESS token, backed
/// by a live active account, produce a principal.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        // NoToken: anonymous request, nothing to do
        return next.run(req).await;
    };

    let path = req.uri().path();

    match state.jwt.check_typed(&token, TokenType::Access) {
        TokenCheck::Invalid(reason) => {
            warn!(path, %reason, "rejected bearer token");
        }
        TokenCheck::Valid(claims) => match assemble_principal(&claims, &state.accounts) {
            Ok(principal) => {
                req.extensions_mut().insert(principal);
            }
            Err(failure) => {
                warn!(path, user_id = claims.user_id, %failure, "authentication failed");
            }
        },
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with_authorization("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_malformed_prefix_treated_as_absent() {
        for value in ["bearer abc", "Basic abc", "Bearerabc", "Token abc"] {
            let headers = headers_with_authorization(value);
            assert_eq!(bearer_token(&headers), None, "value: {}", value);
        }
    }

    #[test]
    fn test_extensions_start_without_principal() {
        let req = Request::new(axum::body::Body::empty());
        assert!(req.extensions().get::<Principal>().is_none());
    }
}
