//! User records and the credential store capability.

use crate::error::UserError;
use serde::{Deserialize, Serialize};

/// A user as seen by the token core. Owned by the credential store; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub role: String,
}

/// Read-only access to the user database.
pub trait CredentialStore: Send + Sync {
    /// Check an email/password pair and return the matching user.
    fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, UserError>;

    /// Fetch a user by id.
    fn lookup(&self, id: i64) -> Result<UserRecord, UserError>;
}
