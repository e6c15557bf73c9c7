//! Claims codec.
//!
//! [`Claims::encode`] builds a claim set and [`Claims::to_map`] turns it into the
//! JSON payload that gets signed. [`Claims::decode`] is the reverse and the only
//! place a raw claim map is read; everything downstream works with typed claims.
//!
//! Wire payload:
//!
//! | claim | type | meaning |
//! |-------|------|---------|
//! | `sub` | integer | user id |
//! | `email` | string | user email |
//! | `role` | string | role name |
//! | `type` | string | `"access"` or `"refresh"` |
//! | `iat` | integer | issued-at, unix seconds |
//! | `exp` | integer | expiry, unix seconds |
//! | `iss` | string | always [`ISSUER`] |
//! | `aud` | string | always [`AUDIENCE`] |
//! | `jti` | string | random token id (optional on decode) |
//!
//! Timestamps are whole 64-bit seconds. Floating point values are rejected.

use crate::error::ClaimsError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Issuer carried by every token.
pub const ISSUER: &str = "warden";

/// Audience carried by every token.
pub const AUDIENCE: &str = "warden-clients";

/// Access or refresh tag embedded in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "access" => Some(TokenType::Access),
            "refresh" => Some(TokenType::Refresh),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed payload of a token. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    subject: i64,
    email: String,
    role: String,
    token_type: TokenType,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    token_id: Option<String>,
}

impl Claims {
    /// Build a claim set with a fresh token id.
    ///
    /// Timestamps are truncated to whole seconds so that encoding and decoding
    /// round-trip exactly.
    pub fn encode(
        subject: i64,
        email: impl Into<String>,
        role: impl Into<String>,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, ClaimsError> {
        let email = email.into();
        let role = role.into();
        if email.is_empty() {
            return Err(ClaimsError::Empty { claim: "email" });
        }
        if role.is_empty() {
            return Err(ClaimsError::Empty { claim: "role" });
        }

        Ok(Self {
            subject,
            email,
            role,
            token_type,
            issued_at: from_unix("iat", issued_at.timestamp())?,
            expires_at: from_unix("exp", expires_at.timestamp())?,
            token_id: Some(Uuid::new_v4().to_string()),
        })
    }

    /// Read a claim set out of a raw claim map.
    pub fn decode(raw: &Map<String, Value>) -> Result<Self, ClaimsError> {
        let subject = require_i64(raw, "sub")?;
        let email = require_non_empty(raw, "email")?;
        let role = require_non_empty(raw, "role")?;

        let type_tag = require_str(raw, "type")?;
        let token_type = TokenType::parse(type_tag).ok_or_else(|| ClaimsError::Invalid {
            claim: "type",
            reason: format!("unknown token type {:?}", type_tag),
        })?;

        let issued_at = from_unix("iat", require_i64(raw, "iat")?)?;
        let expires_at = from_unix("exp", require_i64(raw, "exp")?)?;

        require_constant(raw, "iss", ISSUER)?;
        require_constant(raw, "aud", AUDIENCE)?;

        let token_id = match raw.get("jti") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ClaimsError::Invalid {
                    claim: "jti",
                    reason: "expected a string".to_string(),
                });
            }
        };

        Ok(Self {
            subject,
            email,
            role,
            token_type,
            issued_at,
            expires_at,
            token_id,
        })
    }

    /// Render the claim set as the JSON payload that gets signed.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("sub".into(), Value::from(self.subject));
        map.insert("email".into(), Value::from(self.email.clone()));
        map.insert("role".into(), Value::from(self.role.clone()));
        map.insert("type".into(), Value::from(self.token_type.as_str()));
        map.insert("iat".into(), Value::from(self.issued_at.timestamp()));
        map.insert("exp".into(), Value::from(self.expires_at.timestamp()));
        map.insert("iss".into(), Value::from(ISSUER));
        map.insert("aud".into(), Value::from(AUDIENCE));
        if let Some(jti) = &self.token_id {
            map.insert("jti".into(), Value::from(jti.clone()));
        }
        map
    }

    pub fn subject(&self) -> i64 {
        self.subject
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    pub fn issuer(&self) -> &'static str {
        ISSUER
    }

    pub fn audience(&self) -> &'static str {
        AUDIENCE
    }

    /// Check whether the claims have expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

fn require<'a>(raw: &'a Map<String, Value>, claim: &'static str) -> Result<&'a Value, ClaimsError> {
    match raw.get(claim) {
        None | Some(Value::Null) => Err(ClaimsError::Missing { claim }),
        Some(value) => Ok(value),
    }
}

fn require_i64(raw: &Map<String, Value>, claim: &'static str) -> Result<i64, ClaimsError> {
    require(raw, claim)?
        .as_i64()
        .ok_or_else(|| ClaimsError::Invalid {
            claim,
            reason: "expected a 64-bit integer".to_string(),
        })
}

fn require_str<'a>(raw: &'a Map<String, Value>, claim: &'static str) -> Result<&'a str, ClaimsError> {
    require(raw, claim)?
        .as_str()
        .ok_or_else(|| ClaimsError::Invalid {
            claim,
            reason: "expected a string".to_string(),
        })
}

fn require_non_empty(raw: &Map<String, Value>, claim: &'static str) -> Result<String, ClaimsError> {
    let value = require_str(raw, claim)?;
    if value.is_empty() {
        return Err(ClaimsError::Empty { claim });
    }
    Ok(value.to_string())
}

fn require_constant(
    raw: &Map<String, Value>,
    claim: &'static str,
    expected: &str,
) -> Result<(), ClaimsError> {
    let value = require_str(raw, claim)?;
    if value != expected {
        return Err(ClaimsError::Invalid {
            claim,
            reason: format!("expected {:?}, got {:?}", expected, value),
        });
    }
    Ok(())
}

fn from_unix(claim: &'static str, secs: i64) -> Result<DateTime<Utc>, ClaimsError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| ClaimsError::Invalid {
        claim,
        reason: format!("timestamp {} out of range", secs),
    })
}
