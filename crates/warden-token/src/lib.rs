//! # warden-token
//!
//! Session token lifecycle for Warden.
//!
//! This crate provides:
//! - The claims codec: the one place raw claim maps become typed [`Claims`]
//! - HS256 signing and verification of access and refresh tokens
//! - A concurrency-safe revocation registry for rotated and logged-out refresh tokens,
//!   with a background sweep that drops entries once they expire
//! - The authentication and authorization gates and the refresh/logout flows
//!
//! ## Token Model
//!
//! | Token Type | Lifetime | Revocable | Used For |
//! |------------|----------|-----------|----------|
//! | **Access** | Short (15m default) | No | Authenticating individual requests |
//! | **Refresh** | Long (168h default) | Yes, single use | Minting a new token pair |
//!
//! Both kinds share one signing key and claim shape. They differ only in the
//! `type` claim and TTL, and verification checks the tag explicitly, so a
//! refresh token is never accepted where an access token is expected.

pub mod access;
pub mod claims;
pub mod error;
pub mod keys;
pub mod revocation;
pub mod session;
pub mod sweeper;
pub mod token;

pub use access::{Decision, RoleSet, authorize};
pub use claims::{AUDIENCE, Claims, ISSUER, TokenType};
pub use error::{ClaimsError, Rejection, SigningError, VerifyError, VerifyReason};
pub use keys::SigningSecret;
pub use revocation::RevocationRegistry;
pub use session::{SessionManager, TokenPair};
pub use sweeper::{SweeperHandle, spawn_sweeper};
pub use token::{TokenSigner, TokenVerifier};
