//! Error types shared across crates.

use thiserror::Error;

/// Startup configuration errors. These are fatal: the service must not start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No signing secret was supplied.
    #[error("signing secret is required")]
    MissingSecret,

    /// A duration setting was zero.
    #[error("{field} must be a positive duration")]
    NonPositiveDuration { field: &'static str },

    /// A duration setting could not be parsed.
    #[error("invalid duration for {field}: {value:?} ({reason})")]
    InvalidDuration {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors returned by a [`CredentialStore`](crate::CredentialStore).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// No user matches the given email or id.
    #[error("user not found")]
    NotFound,

    /// The password did not match.
    #[error("bad credentials")]
    BadCredentials,

    /// The store itself failed.
    #[error("credential store error: {0}")]
    Internal(String),
}
