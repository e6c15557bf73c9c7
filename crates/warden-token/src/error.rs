//! Error types for token operations.

use std::fmt;
use thiserror::Error;

/// A claim set could not be built or read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimsError {
    /// A required claim is absent.
    #[error("missing claim: {claim}")]
    Missing { claim: &'static str },

    /// A claim is present but has the wrong shape or value.
    #[error("invalid claim {claim}: {reason}")]
    Invalid { claim: &'static str, reason: String },

    /// A string claim that must carry a value is empty.
    #[error("claim {claim} must not be empty")]
    Empty { claim: &'static str },
}

/// Producing a token failed. Surfaced to callers as a generic server-side failure.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The claims handed to the signer were rejected by the codec.
    #[error("cannot sign token: {0}")]
    InvalidClaims(#[from] ClaimsError),

    /// `iat + ttl` is past the largest representable timestamp.
    #[error("token expiry overflows the timestamp range")]
    ExpiryOverflow,

    /// The underlying HMAC/encoding step failed.
    #[error("failed to sign token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyReason {
    Malformed,
    BadSignature,
    WrongIssuer,
    WrongAudience,
    Expired,
    WrongType,
}

impl VerifyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyReason::Malformed => "malformed",
            VerifyReason::BadSignature => "bad-signature",
            VerifyReason::WrongIssuer => "wrong-issuer",
            VerifyReason::WrongAudience => "wrong-audience",
            VerifyReason::Expired => "expired",
            VerifyReason::WrongType => "wrong-type",
        }
    }
}

impl fmt::Display for VerifyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token verification failed.
///
/// The reason is kept for logs only; every reason maps to the same
/// "unauthorized" outcome at the service boundary.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("token verification failed: {reason}")]
pub struct VerifyError {
    pub reason: VerifyReason,
}

impl VerifyError {
    pub fn new(reason: VerifyReason) -> Self {
        Self { reason }
    }
}

impl From<VerifyReason> for VerifyError {
    fn from(reason: VerifyReason) -> Self {
        Self { reason }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let reason = match err.kind() {
            ErrorKind::InvalidSignature => VerifyReason::BadSignature,
            ErrorKind::InvalidIssuer => VerifyReason::WrongIssuer,
            ErrorKind::InvalidAudience => VerifyReason::WrongAudience,
            ErrorKind::ExpiredSignature => VerifyReason::Expired,
            _ => VerifyReason::Malformed,
        };
        Self { reason }
    }
}

/// Outcome of a rejected boundary operation.
#[derive(Debug, Error)]
pub enum Rejection {
    /// Missing, malformed or unverifiable credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(VerifyReason),

    /// The refresh token was already rotated or logged out.
    #[error("refresh token has been revoked")]
    Revoked,

    /// The caller's role is not in the allowed set.
    #[error("role not permitted")]
    Forbidden,

    /// A replacement token could not be signed.
    #[error(transparent)]
    Internal(#[from] SigningError),
}

impl From<VerifyError> for Rejection {
    fn from(err: VerifyError) -> Self {
        Rejection::Unauthenticated(err.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_labels() {
        assert_eq!(VerifyReason::BadSignature.to_string(), "bad-signature");
        assert_eq!(
            VerifyError::new(VerifyReason::WrongType).to_string(),
            "token verification failed: wrong-type"
        );
    }

    #[test]
    fn test_verify_error_collapses_into_unauthenticated() {
        let rejection: Rejection = VerifyError::new(VerifyReason::Expired).into();
        assert!(matches!(
            rejection,
            Rejection::Unauthenticated(VerifyReason::Expired)
        ));
    }
}
