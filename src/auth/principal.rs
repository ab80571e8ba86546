//! Principal Assembly
//! Mission: Turn validated ACCESS-token claims into an authenticated principal
//!
//! The principal is strictly request-scoped: it lives in the request's
//! extensions and is dropped with the request, never in process-wide state.

use crate::auth::error::AuthError;
use crate::auth::models::{Claims, Permission, Role, TokenType};
use crate::auth::user_store::UserStore;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::fmt;
use tracing::error;

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Coarse + fine authority labels, e.g. ROLE_ADMIN plus every permission
    /// name granted by the role.
    pub fn authorities(&self) -> Vec<&'static str> {
        let mut authorities = vec![self.role.authority()];
        authorities.extend(self.role.permissions().iter().map(Permission::as_str));
        authorities
    }
}

/// Why principal assembly failed. All variants surface to clients as a
/// generic authentication failure; the detail is for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyFailure {
    /// Claims came from a non-ACCESS token
    NotAnAccessToken,
    /// ACCESS token without a role claim
    MissingRoleClaim,
    /// Account behind the token no longer exists
    UserNotFound,
    /// Account exists but is deactivated
    AccountInactive,
    /// Account store was unreachable; treated as failed authentication,
    /// never as a request crash
    LookupFailed,
}

impl fmt::Display for AssemblyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyFailure::NotAnAccessToken => write!(f, "token is not an ACCESS token"),
            AssemblyFailure::MissingRoleClaim => write!(f, "access token has no role claim"),
            AssemblyFailure::UserNotFound => write!(f, "user not found"),
            AssemblyFailure::AccountInactive => write!(f, "account is inactive"),
            AssemblyFailure::LookupFailed => write!(f, "account lookup failed"),
        }
    }
}

/// Build a [`Principal`] from validated ACCESS-token claims plus a fresh
/// account-status read.
///
/// This is the one external touch of the pipeline: exactly one read, no
/// writes. The role comes from the claim but must map into the closed
/// [`Role`] set; decoding already guarantees that, and a missing role claim
/// is a hard failure rather than a default.
pub fn assemble_principal(claims: &Claims, store: &UserStore) -> Result<Principal, AssemblyFailure> {
    if claims.token_type != TokenType::Access {
        return Err(AssemblyFailure::NotAnAccessToken);
    }

    let role = claims.role.ok_or(AssemblyFailure::MissingRoleClaim)?;

    let account = store
        .find_by_id(claims.user_id)
        .map_err(|e| {
            error!(user_id = claims.user_id, error = %e, "account lookup failed");
            AssemblyFailure::LookupFailed
        })?
        .ok_or(AssemblyFailure::UserNotFound)?;

    if !account.is_active {
        return Err(AssemblyFailure::AccountInactive);
    }

    Ok(Principal {
        user_id: account.user_id,
        email: account.email,
        name: account.name,
        role,
        is_active: account.is_active,
        email_verified: account.email_verified,
    })
}

/// Extract the request's principal, rejecting with 401 when the request is
/// unauthenticated. Handlers that merely need "who is calling" use this;
/// route-level access rules live in [`crate::auth::authorize`].
#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_store::UserStore;
    use tempfile::NamedTempFile;

    fn store_with_user(is_active: bool) -> (UserStore, NamedTempFile, i64) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = UserStore::new(temp_file.path().to_str().unwrap()).unwrap();
        let account = store
            .create_account("a@x.com", "password123", "Anna", None, Role::User)
            .unwrap();
        if !is_active {
            store.set_active(account.user_id, false).unwrap();
        }
        (store, temp_file, account.user_id)
    }

    fn access_claims(user_id: i64) -> Claims {
        Claims {
            sub: "a@x.com".to_string(),
            user_id,
            role: Some(Role::User),
            token_type: TokenType::Access,
            iss: "meditation-center".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_assembly_success() {
        let (store, _temp, user_id) = store_with_user(true);

        let principal = assemble_principal(&access_claims(user_id), &store).unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.email, "a@x.com");
        assert_eq!(principal.name, "Anna");
        assert_eq!(principal.role, Role::User);
        assert!(principal.is_active);
    }

    #[test]
    fn test_unknown_account_fails() {
        let (store, _temp, _) = store_with_user(true);

        let result = assemble_principal(&access_claims(9999), &store);
        assert_eq!(result, Err(AssemblyFailure::UserNotFound));
    }

    #[test]
    fn test_inactive_account_fails() {
        let (store, _temp, user_id) = store_with_user(false);

        let result = assemble_principal(&access_claims(user_id), &store);
        assert_eq!(result, Err(AssemblyFailure::AccountInactive));
    }

    #[test]
    fn test_refresh_claims_rejected() {
        let (store, _temp, user_id) = store_with_user(true);

        let claims = Claims {
            role: None,
            token_type: TokenType::Refresh,
            ..access_claims(user_id)
        };
        let result = assemble_principal(&claims, &store);
        assert_eq!(result, Err(AssemblyFailure::NotAnAccessToken));
    }

    #[test]
    fn test_access_claims_without_role_rejected() {
        let (store, _temp, user_id) = store_with_user(true);

        let claims = Claims {
            role: None,
            ..access_claims(user_id)
        };
        let result = assemble_principal(&claims, &store);
        assert_eq!(result, Err(AssemblyFailure::MissingRoleClaim));
    }

    #[test]
    fn test_authorities_combine_role_and_permissions() {
        let (store, _temp, user_id) = store_with_user(true);
        let principal = assemble_principal(&access_claims(user_id), &store).unwrap();

        let authorities = principal.authorities();
        assert!(authorities.contains(&"ROLE_USER"));
        assert!(authorities.contains(&"CREATE_BOOKING"));
        assert!(!authorities.contains(&"CREATE_PROGRAM"));
    }
}
