use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::clock::Clock;

pub const SESSION_TOKEN_TTL_HOURS: i64 = 7 * 24;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const MIN_SECRET_LEN: usize = 32;

/// Why a token was rejected. Callers outside this module only ever see
/// `AppError::Unauthorized`; the kind is kept for logs and tests.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token was issued for a different purpose")]
    WrongPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    purpose: TokenPurpose,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// Identity carried by a session token. Holds no workspace or role data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetClaims {
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifiedToken {
    Session(SessionClaims),
    PasswordReset(ResetClaims),
}

/// Issues and verifies HS256 tokens for sessions and password resets.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            bail!("jwt secret must be at least {MIN_SECRET_LEN} characters long");
        }

        // Expiry is checked against the injected clock instead.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
            session_ttl: Duration::hours(SESSION_TOKEN_TTL_HOURS),
            reset_ttl: Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        })
    }

    pub fn with_ttls(mut self, session_ttl: Duration, reset_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self.reset_ttl = reset_ttl;
        self
    }

    pub fn issue_session_token(
        &self,
        user_id: Uuid,
        email: &str,
        username: &str,
    ) -> anyhow::Result<String> {
        let issued_at = self.clock.now();
        self.encode(TokenClaims {
            sub: user_id.to_string(),
            purpose: TokenPurpose::Session,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.session_ttl).timestamp(),
            email: Some(email.to_owned()),
            username: Some(username.to_owned()),
        })
    }

    pub fn issue_reset_token(&self, user_id: Uuid) -> anyhow::Result<String> {
        let issued_at = self.clock.now();
        self.encode(TokenClaims {
            sub: user_id.to_string(),
            purpose: TokenPurpose::PasswordReset,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.reset_ttl).timestamp(),
            email: None,
            username: None,
        })
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|error| match error.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        match claims.purpose {
            TokenPurpose::Session => {
                let (Some(email), Some(username)) = (claims.email, claims.username) else {
                    return Err(TokenError::Malformed);
                };
                let expires_at =
                    DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;
                Ok(VerifiedToken::Session(SessionClaims { user_id, email, username, expires_at }))
            }
            TokenPurpose::PasswordReset => {
                let issued_at =
                    DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Malformed)?;
                Ok(VerifiedToken::PasswordReset(ResetClaims { user_id, issued_at }))
            }
        }
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        match self.verify(token)? {
            VerifiedToken::Session(claims) => Ok(claims),
            VerifiedToken::PasswordReset(_) => Err(TokenError::WrongPurpose),
        }
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, TokenError> {
        match self.verify(token)? {
            VerifiedToken::PasswordReset(claims) => Ok(claims),
            VerifiedToken::Session(_) => Err(TokenError::WrongPurpose),
        }
    }

    fn encode(&self, claims: TokenClaims) -> anyhow::Result<String> {
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to encode token")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;
    use uuid::Uuid;

    use super::{TokenError, TokenService, VerifiedToken};
    use crate::auth::clock::ManualClock;

    const TEST_SECRET: &str = "noteforge_test_secret_that_is_definitely_long_enough";

    fn service_with_clock() -> (TokenService, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let service = TokenService::new(TEST_SECRET, Arc::new(clock.clone()))
            .expect("service should initialize");
        (service, clock)
    }

    #[test]
    fn rejects_short_secrets() {
        assert!(TokenService::new("too-short", Arc::new(ManualClock::default())).is_err());
    }

    #[test]
    fn issues_and_validates_session_tokens() {
        let (service, _) = service_with_clock();
        let user_id = Uuid::new_v4();

        let token = service
            .issue_session_token(user_id, "ada@example.com", "ada")
            .expect("token should be issued");
        let claims = service.verify_session(&token).expect("token should validate");

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.username, "ada");
    }

    #[test]
    fn session_tokens_live_for_seven_days() {
        let (service, clock) = service_with_clock();
        let token = service
            .issue_session_token(Uuid::new_v4(), "ada@example.com", "ada")
            .expect("token should be issued");

        clock.advance(Duration::days(7) - Duration::seconds(1));
        assert!(service.verify_session(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(service.verify_session(&token), Err(TokenError::Expired));
    }

    #[test]
    fn reset_tokens_expire_after_one_hour() {
        let (service, clock) = service_with_clock();
        let user_id = Uuid::new_v4();
        let token = service.issue_reset_token(user_id).expect("token should be issued");

        clock.advance(Duration::minutes(59));
        assert_eq!(service.verify_reset(&token).map(|claims| claims.user_id), Ok(user_id));

        clock.advance(Duration::minutes(2));
        assert_eq!(service.verify_reset(&token), Err(TokenError::Expired));
    }

    #[test]
    fn purposes_are_not_interchangeable() {
        let (service, _) = service_with_clock();
        let user_id = Uuid::new_v4();
        let reset = service.issue_reset_token(user_id).expect("token should be issued");
        let session = service
            .issue_session_token(user_id, "ada@example.com", "ada")
            .expect("token should be issued");

        assert_eq!(service.verify_session(&reset), Err(TokenError::WrongPurpose));
        assert_eq!(service.verify_reset(&session), Err(TokenError::WrongPurpose));
        assert!(matches!(service.verify(&reset), Ok(VerifiedToken::PasswordReset(_))));
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let (service, clock) = service_with_clock();
        let other = TokenService::new(
            "another_secret_that_is_also_long_enough_to_pass",
            Arc::new(clock),
        )
        .expect("service should initialize");
        let token = other.issue_reset_token(Uuid::new_v4()).expect("token should be issued");

        assert_eq!(service.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn rejects_garbage() {
        let (service, _) = service_with_clock();
        assert_eq!(service.verify("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn rejects_tokens_with_invalid_subject_claim() {
        #[derive(Serialize)]
        struct InvalidSubjectClaims {
            sub: &'static str,
            purpose: &'static str,
            iat: i64,
            exp: i64,
        }

        let (service, clock) = service_with_clock();
        let now = crate::auth::clock::Clock::now(&clock).timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &InvalidSubjectClaims {
                sub: "not-a-uuid",
                purpose: "password_reset",
                iat: now,
                exp: now + 600,
            },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("token should encode");

        assert_eq!(service.verify(&token), Err(TokenError::Malformed));
    }
}
