//! Token signing and verification.

use crate::claims::{AUDIENCE, Claims, ISSUER, TokenType};
use crate::error::{SigningError, VerifyError, VerifyReason};
use crate::keys::SigningSecret;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use std::time::Duration;
use warden_core::ConfigError;
use warden_core::config::ensure_positive;

/// Mints HS256 access and refresh tokens.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl TokenSigner {
    /// Create a signer. Zero TTLs and TTLs whose expiry would overflow the
    /// timestamp range are rejected here, not at signing time.
    pub fn new(
        secret: &SigningSecret,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            encoding_key: secret.encoding_key(),
            access_ttl: to_time_delta("access_ttl", access_ttl)?,
            refresh_ttl: to_time_delta("refresh_ttl", refresh_ttl)?,
        })
    }

    /// Sign an access token for the given user.
    pub fn sign_access(&self, subject: i64, email: &str, role: &str) -> Result<String, SigningError> {
        self.sign(subject, email, role, TokenType::Access, self.access_ttl)
    }

    /// Sign a refresh token for the given user.
    pub fn sign_refresh(&self, subject: i64, email: &str, role: &str) -> Result<String, SigningError> {
        self.sign(subject, email, role, TokenType::Refresh, self.refresh_ttl)
    }

    /// Sign a pre-built claim set as is.
    pub fn sign_claims(&self, claims: &Claims) -> Result<String, SigningError> {
        let header = Header::new(Algorithm::HS256);
        let token = jsonwebtoken::encode(&header, &claims.to_map(), &self.encoding_key)?;
        Ok(token)
    }

    fn sign(
        &self,
        subject: i64,
        email: &str,
        role: &str,
        token_type: TokenType,
        ttl: TimeDelta,
    ) -> Result<String, SigningError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(SigningError::ExpiryOverflow)?;
        let claims = Claims::encode(subject, email, role, token_type, now, expires_at)?;
        self.sign_claims(&claims)
    }
}

/// Verifies tokens minted by a [`TokenSigner`] holding the same secret.
///
/// Checks, in order: signature, expiry, issuer, audience, claim shape and
/// finally the token type tag.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            decoding_key: secret.decoding_key(),
            validation,
        }
    }

    /// Verify an access token.
    pub fn parse_access(&self, raw: &str) -> Result<Claims, VerifyError> {
        self.verify(raw, TokenType::Access)
    }

    /// Verify a refresh token. Does not consult the revocation registry.
    pub fn verify_refresh(&self, raw: &str) -> Result<Claims, VerifyError> {
        self.verify(raw, TokenType::Refresh)
    }

    fn verify(&self, raw: &str, expected: TokenType) -> Result<Claims, VerifyError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(raw, &self.decoding_key, &self.validation)?;

        let claims = Claims::decode(&data.claims).map_err(|e| {
            tracing::debug!(error = %e, "token carries malformed claims");
            VerifyError::new(VerifyReason::Malformed)
        })?;

        if claims.is_expired_at(Utc::now()) {
            return Err(VerifyError::new(VerifyReason::Expired));
        }

        if claims.token_type() != expected {
            return Err(VerifyError::new(VerifyReason::WrongType));
        }

        Ok(claims)
    }
}

fn to_time_delta(field: &'static str, ttl: Duration) -> Result<TimeDelta, ConfigError> {
    ensure_positive(field, ttl)?;
    let invalid = |reason: String| ConfigError::InvalidDuration {
        field,
        value: format!("{:?}", ttl),
        reason,
    };
    let delta = TimeDelta::from_std(ttl).map_err(|e| invalid(e.to_string()))?;
    if Utc::now().checked_add_signed(delta).is_none() {
        return Err(invalid("expiry would overflow the timestamp range".to_string()));
    }
    Ok(delta)
}
