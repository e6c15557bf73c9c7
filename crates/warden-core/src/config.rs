//! Token core configuration.
//!
//! The core takes its settings at construction time through [`TokenConfig`].
//! Loading them from files or the environment is the caller's job; the
//! helpers here only cover defaults, duration parsing and validation.

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// Default access token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime (168 hours).
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(168 * 60 * 60);

/// Default interval between revocation sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Settings for the token signer, verifier and revocation sweeper.
#[derive(Clone)]
pub struct TokenConfig {
    /// Symmetric HMAC secret. Required, no default.
    pub secret: Vec<u8>,
    /// Lifetime of access tokens.
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens.
    pub refresh_ttl: Duration,
    /// How often expired revocation entries are reclaimed.
    pub sweep_interval: Duration,
}

impl TokenConfig {
    /// Create a config with the given secret and default durations.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        ensure_positive("access_ttl", self.access_ttl)?;
        ensure_positive("refresh_ttl", self.refresh_ttl)?;
        ensure_positive("sweep_interval", self.sweep_interval)?;
        Ok(())
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

/// Fail with [`ConfigError::NonPositiveDuration`] if `value` is zero.
pub fn ensure_positive(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        return Err(ConfigError::NonPositiveDuration { field });
    }
    Ok(())
}

/// Parse a human-readable duration such as `"15m"`, `"168h"` or `"1h 30m"`.
pub fn parse_duration(field: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidDuration {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
