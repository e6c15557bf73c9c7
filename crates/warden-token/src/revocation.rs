//! Revocation registry for refresh tokens.
//!
//! Holds refresh tokens that were rotated or logged out, keyed by the raw token
//! string, until their own `exp` passes. After that the token fails verification
//! anyway, so [`RevocationRegistry::sweep`] drops the entry. The registry only
//! ever holds refresh tokens; access tokens are not revocable.
//!
//! Reads take a shared lock and writes an exclusive one. No I/O happens while a
//! lock is held.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Concurrency-safe set of revoked, not yet expired refresh tokens.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the token has been revoked. Sees every `revoke` that returned
    /// before this call started.
    pub fn is_revoked(&self, token: &str) -> bool {
        self.read().contains_key(token)
    }

    /// Revoke a token until `expires_at`, which must be the token's own `exp`.
    /// Revoking an already revoked token overwrites its entry.
    pub fn revoke(&self, token: impl Into<String>, expires_at: DateTime<Utc>) {
        self.write().insert(token.into(), expires_at);
    }

    /// Revoke a token only if it is not already revoked.
    ///
    /// Returns `true` if this call added the entry. Used by rotation so only
    /// one of several concurrent refreshes with the same token wins.
    pub fn revoke_once(&self, token: impl Into<String>, expires_at: DateTime<Utc>) -> bool {
        match self.write().entry(token.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(expires_at);
                true
            }
        }
    }

    /// Remove every entry that has expired. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// Remove every entry whose expiry is before `now`.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at >= now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every critical section leaves the map consistent, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
