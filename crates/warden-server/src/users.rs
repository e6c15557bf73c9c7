use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::collections::HashMap;
use warden_core::{CredentialStore, UserError, UserRecord};

/// Password shared by the demo accounts.
pub const DEMO_PASSWORD: &str = "secret123";

struct StoredUser {
    record: UserRecord,
    /// Argon2 PHC string
    password_hash: String,
}

/// Credential store kept in memory, keyed by email.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, StoredUser>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `admin@example.com` (admin) and `user@example.com` (user).
    pub fn with_demo_users() -> anyhow::Result<Self> {
        let mut store = Self::new();
        store.insert(1, "admin@example.com", "admin", DEMO_PASSWORD)?;
        store.insert(2, "user@example.com", "user", DEMO_PASSWORD)?;
        Ok(store)
    }

    /// Add or replace a user, hashing the password.
    pub fn insert(&mut self, id: i64, email: &str, role: &str, password: &str) -> anyhow::Result<()> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();

        self.users.insert(
            email.to_string(),
            StoredUser {
                record: UserRecord {
                    id,
                    email: email.to_string(),
                    role: role.to_string(),
                },
                password_hash,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for InMemoryUserStore {
    fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, UserError> {
        let user = self.users.get(email).ok_or(UserError::NotFound)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| UserError::Internal(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| UserError::BadCredentials)?;

        Ok(user.record.clone())
    }

    fn lookup(&self, id: i64) -> Result<UserRecord, UserError> {
        self.users
            .values()
            .find(|u| u.record.id == id)
            .map(|u| u.record.clone())
            .ok_or(UserError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_users() {
        let store = InMemoryUserStore::with_demo_users().unwrap();
        assert_eq!(store.len(), 2);

        let admin = store.authenticate("admin@example.com", DEMO_PASSWORD).unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.role, "admin");

        assert_eq!(
            store.authenticate("admin@example.com", "wrong"),
            Err(UserError::BadCredentials)
        );
        assert_eq!(
            store.authenticate("nobody@example.com", DEMO_PASSWORD),
            Err(UserError::NotFound)
        );

        assert_eq!(store.lookup(2).unwrap().email, "user@example.com");
        assert_eq!(store.lookup(42), Err(UserError::NotFound));
    }

    #[test]
    fn test_passwords_are_not_stored_in_clear() {
        let mut store = InMemoryUserStore::new();
        store.insert(7, "x@example.com", "user", "plaintext").unwrap();
        let stored = &store.users["x@example.com"];
        assert!(stored.password_hash.starts_with("$argon2"));
        assert!(!stored.password_hash.contains("plaintext"));
    }
}
