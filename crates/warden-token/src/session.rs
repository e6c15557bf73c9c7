//! Boundary operations: issue, refresh, logout, authenticate and authorize.
//!
//! A refresh token moves through these states:
//!
//! ```text
//! Issued -> Active -> Revoked -> Expired
//!              \__________________/
//! ```
//!
//! `Active` means it verifies and is not in the registry. A successful refresh
//! mints one successor pair and moves the presented token to `Revoked`, so each
//! refresh token can be rotated exactly once. Logout revokes a verifying token
//! and silently ignores one that does not verify. `Expired` is reached by time
//! alone; the sweeper drops any registry entry left behind.

use crate::access::{self, Decision, RoleSet};
use crate::claims::Claims;
use crate::error::{Rejection, SigningError, VerifyReason};
use crate::keys::SigningSecret;
use crate::revocation::RevocationRegistry;
use crate::sweeper::{SweeperHandle, spawn_sweeper};
use crate::token::{TokenSigner, TokenVerifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use warden_core::{ConfigError, TokenConfig, UserRecord};

const BEARER_PREFIX: &str = "Bearer ";

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Owns the signer and verifier and shares the revocation registry.
pub struct SessionManager {
    signer: TokenSigner,
    verifier: TokenVerifier,
    registry: Arc<RevocationRegistry>,
    sweep_interval: Duration,
}

impl SessionManager {
    /// Build from validated settings. Any [`ConfigError`] here must abort startup.
    pub fn new(config: &TokenConfig, registry: Arc<RevocationRegistry>) -> Result<Self, ConfigError> {
        config.validate()?;
        let secret = SigningSecret::from_bytes(config.secret.clone())?;

        Ok(Self {
            signer: TokenSigner::new(&secret, config.access_ttl, config.refresh_ttl)?,
            verifier: TokenVerifier::new(&secret),
            registry,
            sweep_interval: config.sweep_interval,
        })
    }

    pub fn registry(&self) -> &Arc<RevocationRegistry> {
        &self.registry
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Start the periodic registry sweep with the configured interval.
    pub fn start_sweeper(&self) -> SweeperHandle {
        spawn_sweeper(Arc::clone(&self.registry), self.sweep_interval)
    }

    /// Mint an access/refresh pair for a user.
    pub fn issue_token_pair(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
    ) -> Result<TokenPair, SigningError> {
        let access = self.signer.sign_access(user_id, email, role)?;
        let refresh = self.signer.sign_refresh(user_id, email, role)?;
        Ok(TokenPair { access, refresh })
    }

    /// Mint a pair for a user that just passed a credential check.
    pub fn issue_for(&self, user: &UserRecord) -> Result<TokenPair, SigningError> {
        self.issue_token_pair(user.id, &user.email, &user.role)
    }

    /// Exchange an active refresh token for a new pair and revoke it.
    pub fn refresh_token_pair(&self, presented: &str) -> Result<TokenPair, Rejection> {
        let presented = presented.trim();

        let claims = self.verifier.verify_refresh(presented).inspect_err(|e| {
            tracing::debug!(reason = %e.reason, "refresh token rejected");
        })?;

        if self.registry.is_revoked(presented) {
            tracing::debug!(sub = claims.subject(), "revoked refresh token presented");
            return Err(Rejection::Revoked);
        }

        let pair = self
            .issue_token_pair(claims.subject(), claims.email(), claims.role())
            .inspect_err(|e| {
                tracing::error!(sub = claims.subject(), error = %e, "failed to sign rotated token pair");
            })?;

        // Another request may have rotated the same token since the check above.
        if !self.registry.revoke_once(presented, claims.expires_at()) {
            tracing::warn!(sub = claims.subject(), "refresh token rotated concurrently");
            return Err(Rejection::Revoked);
        }

        tracing::debug!(sub = claims.subject(), "refresh token rotated");
        Ok(pair)
    }

    /// Log out: revoke the refresh token if it verifies. Always succeeds.
    pub fn invalidate(&self, presented: &str) {
        let presented = presented.trim();

        match self.verifier.verify_refresh(presented) {
            Ok(claims) => {
                self.registry.revoke(presented, claims.expires_at());
                tracing::debug!(sub = claims.subject(), "refresh token revoked on logout");
            }
            Err(e) => {
                tracing::debug!(reason = %e.reason, "logout with unverifiable refresh token");
            }
        }
    }

    /// Turn an `Authorization` header value into verified access claims.
    ///
    /// Access tokens are not revocable, so the registry is not consulted.
    pub fn authenticate_bearer(&self, header_value: &str) -> Result<Claims, Rejection> {
        let Some(raw) = header_value.strip_prefix(BEARER_PREFIX) else {
            tracing::debug!("missing or malformed bearer credential");
            return Err(Rejection::Unauthenticated(VerifyReason::Malformed));
        };

        self.verifier.parse_access(raw).map_err(|e| {
            tracing::debug!(reason = %e.reason, "bearer token rejected");
            Rejection::from(e)
        })
    }

    /// Whether the claims' role is in `allowed`.
    pub fn authorize(&self, claims: &Claims, allowed: &RoleSet) -> bool {
        access::authorize(claims, allowed) == Decision::Permit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenType;
    use chrono::{Duration as ChronoDuration, Utc};

    fn manager() -> SessionManager {
        SessionManager::new(
            &TokenConfig::new("session-test-secret"),
            Arc::new(RevocationRegistry::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_missing_secret() {
        let result = SessionManager::new(
            &TokenConfig::new(Vec::new()),
            Arc::new(RevocationRegistry::new()),
        );
        assert!(matches!(result, Err(ConfigError::MissingSecret)));
    }

    #[test]
    fn test_rejects_ttl_past_timestamp_range() {
        let huge = warden_core::parse_duration("access_ttl", "1000000years").unwrap();
        let result = SessionManager::new(
            &TokenConfig::new("session-test-secret").with_access_ttl(huge),
            Arc::new(RevocationRegistry::new()),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration { field: "access_ttl", .. })
        ));
    }

    #[test]
    fn test_refresh_body_tolerates_padding() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();
        assert!(manager.refresh_token_pair(&format!(" {}\n", pair.refresh)).is_ok());
        assert!(manager.registry().is_revoked(&pair.refresh));
    }

    #[test]
    fn test_issue_pair_yields_typed_tokens() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();

        let access = manager.verifier().parse_access(&pair.access).unwrap();
        let refresh = manager.verifier().verify_refresh(&pair.refresh).unwrap();
        assert_eq!(access.token_type(), TokenType::Access);
        assert_eq!(refresh.token_type(), TokenType::Refresh);
        assert_eq!(refresh.subject(), 2);
    }

    #[test]
    fn test_refresh_rotates_once() {
        let manager = manager();
        let original = manager.issue_token_pair(2, "user@example.com", "user").unwrap();

        let rotated = manager.refresh_token_pair(&original.refresh).unwrap();
        assert_ne!(rotated.refresh, original.refresh);
        assert!(manager.registry().is_revoked(&original.refresh));

        let claims = manager.verifier().parse_access(&rotated.access).unwrap();
        assert_eq!(claims.subject(), 2);
        assert_eq!(claims.email(), "user@example.com");
        assert_eq!(claims.role(), "user");

        assert!(matches!(
            manager.refresh_token_pair(&original.refresh),
            Err(Rejection::Revoked)
        ));

        // The successor is itself usable once.
        assert!(manager.refresh_token_pair(&rotated.refresh).is_ok());
    }

    #[test]
    fn test_revoked_entry_carries_token_expiry() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();
        let exp = manager.verifier().verify_refresh(&pair.refresh).unwrap().expires_at();

        manager.refresh_token_pair(&pair.refresh).unwrap();

        assert_eq!(manager.registry().sweep_at(exp), 0);
        assert_eq!(manager.registry().sweep_at(exp + ChronoDuration::seconds(1)), 1);
    }

    #[test]
    fn test_refresh_with_access_token_is_unauthenticated() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();

        assert!(matches!(
            manager.refresh_token_pair(&pair.access),
            Err(Rejection::Unauthenticated(VerifyReason::WrongType))
        ));
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn test_logout_revokes_valid_token() {
        let manager = manager();
        let pair = manager.issue_token_pair(1, "admin@example.com", "admin").unwrap();

        manager.invalidate(&pair.refresh);
        assert!(manager.registry().is_revoked(&pair.refresh));
        assert!(matches!(
            manager.refresh_token_pair(&pair.refresh),
            Err(Rejection::Revoked)
        ));
    }

    #[test]
    fn test_logout_with_expired_token_does_not_touch_registry() {
        let manager = manager();
        let now = Utc::now();
        let claims = Claims::encode(
            2,
            "user@example.com",
            "user",
            TokenType::Refresh,
            now - ChronoDuration::days(8),
            now - ChronoDuration::days(1),
        )
        .unwrap();
        let expired = manager.signer.sign_claims(&claims).unwrap();

        manager.invalidate(&expired);
        manager.invalidate("garbage");
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn test_authenticate_bearer() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();

        let claims = manager
            .authenticate_bearer(&format!("Bearer {}", pair.access))
            .unwrap();
        assert_eq!(claims.subject(), 2);
        assert_eq!(claims.email(), "user@example.com");
        assert_eq!(claims.role(), "user");

        assert!(manager.authenticate_bearer("").is_err());
        assert!(manager.authenticate_bearer(&pair.access).is_err());
        assert!(manager.authenticate_bearer("Bearer ").is_err());
        assert!(manager.authenticate_bearer(&format!("Bearer  {}", pair.access)).is_err());
        assert!(manager.authenticate_bearer(&format!("Bearer {} ", pair.access)).is_err());
        assert!(manager.authenticate_bearer(&format!("bearer {}", pair.access)).is_err());
        assert!(matches!(
            manager.authenticate_bearer(&format!("Bearer {}", pair.refresh)),
            Err(Rejection::Unauthenticated(VerifyReason::WrongType))
        ));
    }

    #[test]
    fn test_authorize() {
        let manager = manager();
        let pair = manager.issue_token_pair(2, "user@example.com", "user").unwrap();
        let claims = manager.verifier().parse_access(&pair.access).unwrap();

        let admins: RoleSet = ["admin"].into_iter().collect();
        let users: RoleSet = ["user", "admin"].into_iter().collect();
        assert!(!manager.authorize(&claims, &admins));
        assert!(manager.authorize(&claims, &users));
        assert!(!manager.authorize(&claims, &RoleSet::new()));
    }

    #[tokio::test]
    async fn test_start_sweeper_uses_shared_registry() {
        let manager = SessionManager::new(
            &TokenConfig::new("session-test-secret")
                .with_sweep_interval(std::time::Duration::from_millis(10)),
            Arc::new(RevocationRegistry::new()),
        )
        .unwrap();
        manager
            .registry()
            .revoke("stale", Utc::now() - ChronoDuration::seconds(1));

        let handle = manager.start_sweeper();
        let mut waited = 0;
        while !manager.registry().is_empty() && waited < 200 {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            waited += 1;
        }
        assert!(manager.registry().is_empty());
        handle.shutdown().await;
    }
}
