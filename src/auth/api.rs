//! Authentication API Endpoints
//! Mission: Provide registration, login, token refresh and user management

use crate::auth::error::AuthError;
use crate::auth::jwt::{InvalidTokenReason, JwtCodec, TokenCheck};
use crate::auth::models::{
    AccountResponse, CreateUserRequest, LoginRequest, RefreshRequest, RegisterRequest, Role,
    SetActiveRequest, TokenResponse, TokenType,
};
use crate::auth::principal::Principal;
use crate::auth::user_store::UserStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Shared auth state: the account store and the token codec, both built once
/// at startup and cloned cheaply per request.
#[derive(Clone)]
pub struct AuthState {
    pub accounts: Arc<UserStore>,
    pub jwt: Arc<JwtCodec>,
}

impl AuthState {
    pub fn new(accounts: Arc<UserStore>, jwt: Arc<JwtCodec>) -> Self {
        Self { accounts, jwt }
    }

    fn token_pair(&self, user_id: i64, email: &str, role: Role) -> Result<TokenResponse, AuthError> {
        let access_token = self
            .jwt
            .issue_access_token(user_id, email, role)
            .map_err(internal)?;
        let refresh_token = self
            .jwt
            .issue_refresh_token(user_id, email)
            .map_err(internal)?;

        Ok(TokenResponse {
            access_token,
            refresh_token: Some(refresh_token),
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_expires_in_secs(),
        })
    }
}

fn internal(e: anyhow::Error) -> AuthError {
    error!(error = %e, "auth operation failed");
    AuthError::Internal
}

/// Register a new user - POST /api/auth/register
///
/// New accounts always start as USER, active, with an unverified email.
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    if state.accounts.email_exists(&payload.email).map_err(internal)? {
        warn!("registration attempt with existing email");
        return Err(AuthError::EmailAlreadyRegistered);
    }

    let account = state
        .accounts
        .create_account(
            &payload.email,
            &payload.password,
            &payload.name,
            payload.mobile_number.as_deref(),
            Role::User,
        )
        .map_err(internal)?;

    info!(user_id = account.user_id, "user registered");

    let tokens = state.token_pair(account.user_id, &account.email, account.role)?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login - POST /api/auth/login
///
/// Unknown email and wrong password produce the same response; neither half
/// of the credential pair is ever singled out.
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let found = state
        .accounts
        .find_by_email_with_credential(&payload.email)
        .map_err(internal)?;

    let Some(cred) = found else {
        warn!("failed login attempt");
        return Err(AuthError::InvalidCredentials);
    };

    let password_ok =
        bcrypt::verify(&payload.password, &cred.password_hash).map_err(|e| internal(e.into()))?;
    if !password_ok {
        warn!(user_id = cred.account.user_id, "failed login attempt");
        return Err(AuthError::InvalidCredentials);
    }

    if !cred.account.is_active {
        warn!(user_id = cred.account.user_id, "login attempt on inactive account");
        return Err(AuthError::AccountInactive);
    }

    info!(
        user_id = cred.account.user_id,
        role = cred.account.role.as_str(),
        "login successful"
    );

    let tokens = state.token_pair(cred.account.user_id, &cred.account.email, cred.account.role)?;
    Ok(Json(tokens))
}

/// Refresh - POST /api/auth/refresh
///
/// Requires a REFRESH-class token and re-checks the account before minting a
/// new access token. The response carries no new refresh token; the role on
/// the fresh token comes from the store, not the old claims.
pub async fn refresh(
    State(state): State<AuthState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let claims = match state
        .jwt
        .check_typed(&payload.refresh_token, TokenType::Refresh)
    {
        TokenCheck::Valid(claims) => claims,
        TokenCheck::Invalid(InvalidTokenReason::WrongType { .. }) => {
            warn!("non-refresh token presented to refresh flow");
            return Err(AuthError::ExpectedRefreshToken);
        }
        TokenCheck::Invalid(reason) => {
            warn!(%reason, "refresh token rejected");
            return Err(AuthError::InvalidRefreshToken);
        }
    };

    let account = state
        .accounts
        .find_by_id(claims.user_id)
        .map_err(internal)?
        .ok_or(AuthError::UserNotFound)?;

    if !account.is_active {
        return Err(AuthError::AccountInactive);
    }

    let access_token = state
        .jwt
        .issue_access_token(account.user_id, &account.email, account.role)
        .map_err(internal)?;

    info!(user_id = account.user_id, "access token refreshed");

    Ok(Json(TokenResponse {
        access_token,
        refresh_token: None,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt.access_expires_in_secs(),
    }))
}

/// Logout - POST /api/auth/logout
///
/// Tokens are stateless and there is no revocation list, so logout is a
/// deliberate no-op: clients discard their tokens.
pub async fn logout() -> StatusCode {
    StatusCode::OK
}

/// Current user - GET /api/auth/me
pub async fn me(principal: Principal) -> Json<AccountResponse> {
    Json(AccountResponse {
        user_id: principal.user_id,
        email: principal.email,
        name: principal.name,
        role: principal.role,
        is_active: principal.is_active,
        email_verified: principal.email_verified,
    })
}

/// List all users - GET /api/admin/users
pub async fn list_users(
    State(state): State<AuthState>,
) -> Result<Json<Vec<AccountResponse>>, AuthError> {
    let accounts = state.accounts.list_accounts().map_err(internal)?;
    let response = accounts.iter().map(AccountResponse::from_account).collect();
    Ok(Json(response))
}

/// Create user - POST /api/admin/users
pub async fn create_user(
    State(state): State<AuthState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AuthError> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    if state.accounts.email_exists(&payload.email).map_err(internal)? {
        return Err(AuthError::EmailAlreadyRegistered);
    }

    let account = state
        .accounts
        .create_account(
            &payload.email,
            &payload.password,
            &payload.name,
            payload.mobile_number.as_deref(),
            payload.role,
        )
        .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from_account(&account))))
}

/// Activate/deactivate user - PUT /api/admin/users/:id/active
///
/// Deactivation locks the account out on its next request; the pipeline
/// re-reads account status every time.
pub async fn set_user_active(
    State(state): State<AuthState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<StatusCode, AuthError> {
    state
        .accounts
        .set_active(user_id, payload.is_active)
        .map_err(|_| AuthError::AccountNotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete user - DELETE /api/admin/users/:id
pub async fn delete_user(
    principal: Principal,
    State(state): State<AuthState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AuthError> {
    if user_id == principal.user_id {
        return Err(AuthError::CannotDeleteSelf);
    }

    state
        .accounts
        .delete_account(user_id)
        .map_err(|_| AuthError::AccountNotFound)?;

    Ok(StatusCode::NO_CONTENT)
}
