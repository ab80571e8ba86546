//! JWT Token Codec
//! Mission: Issue and validate signed bearer tokens (HS256)
//!
//! Access tokens are short-lived and carry the user's role; refresh tokens
//! are long-lived and carry minimal claims. Validation is a tri-state
//! affair: a token string is either valid, invalid for a reason, or simply
//! absent (the caller's concern). Nothing here panics on adversarial input.

use crate::auth::models::{Claims, Role, TokenType};
use crate::config::JwtConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use tracing::debug;

/// Why a presented token was rejected. Never shown verbatim to clients;
/// the failure translator maps everything to generic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenReason {
    Expired,
    BadSignature,
    WrongIssuer,
    Malformed,
    WrongType { expected: TokenType },
}

impl fmt::Display for InvalidTokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidTokenReason::Expired => write!(f, "token has expired"),
            InvalidTokenReason::BadSignature => write!(f, "signature verification failed"),
            InvalidTokenReason::WrongIssuer => write!(f, "issuer mismatch"),
            InvalidTokenReason::Malformed => write!(f, "malformed token"),
            InvalidTokenReason::WrongType { expected } => {
                write!(f, "wrong token type, expected {}", expected.as_str())
            }
        }
    }
}

/// Outcome of checking a token string.
#[derive(Debug, Clone)]
pub enum TokenCheck {
    Valid(Claims),
    Invalid(InvalidTokenReason),
}

/// Token codec holding the process-lifetime signing key.
///
/// One shared symmetric secret signs and verifies every token; there is no
/// key rotation and no asymmetric mode.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl_ms: i64,
    refresh_ttl_ms: i64,
}

impl JwtCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No grace window: expiry comparisons are exact.
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.clone()]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl_ms: config.access_token_expiration_ms,
            refresh_ttl_ms: config.refresh_token_expiration_ms,
        }
    }

    /// Issue an ACCESS token carrying userId, email and role.
    pub fn issue_access_token(&self, user_id: i64, email: &str, role: Role) -> Result<String> {
        self.issue(user_id, email, Some(role), TokenType::Access, self.access_ttl_ms)
    }

    /// Issue a REFRESH token with minimal claims (no role).
    pub fn issue_refresh_token(&self, user_id: i64, email: &str) -> Result<String> {
        self.issue(user_id, email, None, TokenType::Refresh, self.refresh_ttl_ms)
    }

    fn issue(
        &self,
        user_id: i64,
        email: &str,
        role: Option<Role>,
        token_type: TokenType,
        ttl_ms: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            user_id,
            role,
            token_type,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: now.timestamp_millis().saturating_add(ttl_ms) / 1000,
        };

        debug!(
            user_id,
            token_type = token_type.as_str(),
            "issuing {} token",
            token_type.as_str()
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign token")
    }

    /// Check signature, issuer and expiry. Any parse error, signature
    /// mismatch or malformed structure yields `Invalid`; this never panics
    /// and never propagates an error across the request pipeline.
    ///
    /// The expiry boundary is exclusive: a token whose `exp` equals the
    /// current second is already expired.
    pub fn check(&self, token: &str) -> TokenCheck {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => return TokenCheck::Invalid(classify_error(&e)),
        };

        if data.claims.exp <= Utc::now().timestamp() {
            return TokenCheck::Invalid(InvalidTokenReason::Expired);
        }

        TokenCheck::Valid(data.claims)
    }

    /// Check a token and additionally require a token class. A valid token
    /// of the wrong class is as invalid as a forged one.
    pub fn check_typed(&self, token: &str, expected: TokenType) -> TokenCheck {
        match self.check(token) {
            TokenCheck::Valid(claims) if claims.token_type != expected => {
                TokenCheck::Invalid(InvalidTokenReason::WrongType { expected })
            }
            other => other,
        }
    }

    /// Convenience predicate over [`JwtCodec::check`].
    pub fn is_valid(&self, token: &str) -> bool {
        matches!(self.check(token), TokenCheck::Valid(_))
    }

    /// Access token lifetime in seconds, for `expires_in` response fields.
    pub fn access_expires_in_secs(&self) -> i64 {
        self.access_ttl_ms / 1000
    }
}

fn classify_error(error: &jsonwebtoken::errors::Error) -> InvalidTokenReason {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::ExpiredSignature => InvalidTokenReason::Expired,
        ErrorKind::InvalidSignature => InvalidTokenReason::BadSignature,
        ErrorKind::InvalidIssuer => InvalidTokenReason::WrongIssuer,
        _ => InvalidTokenReason::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> JwtCodec {
        JwtCodec::new(&JwtConfig {
            secret: "test-secret-key-0123456789abcdef".to_string(),
            access_token_expiration_ms: 900_000,
            refresh_token_expiration_ms: 604_800_000,
            issuer: "meditation-center".to_string(),
        })
    }

    fn codec_with_access_ttl(ttl_ms: i64) -> JwtCodec {
        JwtCodec::new(&JwtConfig {
            secret: "test-secret-key-0123456789abcdef".to_string(),
            access_token_expiration_ms: ttl_ms,
            refresh_token_expiration_ms: 604_800_000,
            issuer: "meditation-center".to_string(),
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let codec = test_codec();
        let token = codec
            .issue_access_token(1, "a@x.com", Role::User)
            .unwrap();

        assert!(codec.is_valid(&token));
        match codec.check(&token) {
            TokenCheck::Valid(claims) => {
                assert_eq!(claims.user_id, 1);
                assert_eq!(claims.sub, "a@x.com");
                assert_eq!(claims.role, Some(Role::User));
                assert_eq!(claims.token_type, TokenType::Access);
                assert_eq!(claims.iss, "meditation-center");
            }
            TokenCheck::Invalid(reason) => panic!("fresh token rejected: {}", reason),
        }
    }

    #[test]
    fn test_refresh_token_carries_no_role() {
        let codec = test_codec();
        let token = codec.issue_refresh_token(7, "b@x.com").unwrap();

        match codec.check(&token) {
            TokenCheck::Valid(claims) => {
                assert_eq!(claims.role, None);
                assert_eq!(claims.token_type, TokenType::Refresh);
            }
            TokenCheck::Invalid(reason) => panic!("fresh refresh token rejected: {}", reason),
        }
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        // ttl of 0 ms puts exp at (or before) the current second
        let codec = codec_with_access_ttl(0);
        let token = codec.issue_access_token(1, "a@x.com", Role::User).unwrap();

        match codec.check(&token) {
            TokenCheck::Invalid(InvalidTokenReason::Expired) => {}
            other => panic!("expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token_rejected() {
        let codec = test_codec();
        assert!(!codec.is_valid("invalid.token.here"));
        assert!(!codec.is_valid(""));
        assert!(!codec.is_valid("not-even-a-jwt"));
    }

    #[test]
    fn test_signature_tampering_rejected() {
        let codec = test_codec();
        let token = codec.issue_access_token(1, "a@x.com", Role::User).unwrap();

        // flip the last byte of the signature segment
        let mut bytes = token.into_bytes();
        let last = *bytes.last().unwrap();
        *bytes.last_mut().unwrap() = if last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        match codec.check(&tampered) {
            TokenCheck::Invalid(_) => {}
            TokenCheck::Valid(_) => panic!("tampered signature accepted"),
        }
    }

    #[test]
    fn test_different_secrets_reject() {
        let codec1 = test_codec();
        let codec2 = JwtCodec::new(&JwtConfig {
            secret: "another-secret-key-0123456789abcd".to_string(),
            access_token_expiration_ms: 900_000,
            refresh_token_expiration_ms: 604_800_000,
            issuer: "meditation-center".to_string(),
        });

        let token = codec1.issue_access_token(1, "a@x.com", Role::User).unwrap();
        assert!(!codec2.is_valid(&token));
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let codec = test_codec();
        let other_issuer = JwtCodec::new(&JwtConfig {
            secret: "test-secret-key-0123456789abcdef".to_string(),
            access_token_expiration_ms: 900_000,
            refresh_token_expiration_ms: 604_800_000,
            issuer: "somewhere-else".to_string(),
        });

        let token = other_issuer
            .issue_access_token(1, "a@x.com", Role::User)
            .unwrap();
        match codec.check(&token) {
            TokenCheck::Invalid(InvalidTokenReason::WrongIssuer) => {}
            other => panic!("expected WrongIssuer, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_token_fails_access_check() {
        let codec = test_codec();
        let refresh = codec.issue_refresh_token(1, "a@x.com").unwrap();

        match codec.check_typed(&refresh, TokenType::Access) {
            TokenCheck::Invalid(InvalidTokenReason::WrongType { expected }) => {
                assert_eq!(expected, TokenType::Access);
            }
            other => panic!("expected WrongType, got {:?}", other),
        }

        // and the other direction
        let access = codec.issue_access_token(1, "a@x.com", Role::User).unwrap();
        match codec.check_typed(&access, TokenType::Refresh) {
            TokenCheck::Invalid(InvalidTokenReason::WrongType { .. }) => {}
            other => panic!("expected WrongType, got {:?}", other),
        }
    }

    #[test]
    fn test_expires_in_seconds() {
        let codec = test_codec();
        assert_eq!(codec.access_expires_in_secs(), 900);
    }
}
