//! Role-based authorization.

use crate::claims::Claims;
use crate::error::Rejection;
use std::collections::HashSet;

/// Set of role names allowed to reach a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: HashSet<String>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Forbidden,
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }

    /// `Forbidden` becomes [`Rejection::Forbidden`].
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Decision::Permit => Ok(()),
            Decision::Forbidden => Err(Rejection::Forbidden),
        }
    }
}

/// Permit iff the claims' role is in `allowed`. An empty set permits nobody.
pub fn authorize(claims: &Claims, allowed: &RoleSet) -> Decision {
    if allowed.contains(claims.role()) {
        Decision::Permit
    } else {
        Decision::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenType;
    use chrono::{Duration, Utc};

    fn claims_with_role(role: &str) -> Claims {
        let now = Utc::now();
        Claims::encode(
            1,
            "someone@example.com",
            role,
            TokenType::Access,
            now,
            now + Duration::minutes(5),
        )
        .unwrap()
    }

    #[test]
    fn test_role_membership() {
        let admins: RoleSet = ["admin"].into_iter().collect();

        assert_eq!(authorize(&claims_with_role("user"), &admins), Decision::Forbidden);
        assert_eq!(authorize(&claims_with_role("admin"), &admins), Decision::Permit);
    }

    #[test]
    fn test_multiple_roles() {
        let staff: RoleSet = ["admin", "support"].into_iter().collect();
        assert!(authorize(&claims_with_role("support"), &staff).is_permit());
        assert!(!authorize(&claims_with_role("user"), &staff).is_permit());
    }

    #[test]
    fn test_empty_set_forbids_everyone() {
        let nobody = RoleSet::new();
        assert!(nobody.is_empty());
        assert_eq!(authorize(&claims_with_role("admin"), &nobody), Decision::Forbidden);
    }

    #[test]
    fn test_forbidden_into_rejection() {
        assert!(Decision::Permit.into_result().is_ok());
        assert!(matches!(
            Decision::Forbidden.into_result(),
            Err(Rejection::Forbidden)
        ));
    }
}
