//! # warden-core
//!
//! Types shared by every Warden crate:
//! - [`UserRecord`] and the [`CredentialStore`] capability the token core reads users through
//! - [`TokenConfig`], the validated settings the token core is constructed from
//! - [`ConfigError`] and [`UserError`]

pub mod config;
pub mod error;
pub mod user;

pub use config::{TokenConfig, parse_duration};
pub use error::{ConfigError, UserError};
pub use user::{CredentialStore, UserRecord};
