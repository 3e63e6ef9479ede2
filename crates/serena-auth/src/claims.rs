//! JWT Claims structure
//!
//! Defines the claims carried in access tokens. The subject is the person
//! id, so handlers never need a second lookup to know who is calling.

use serena_core::models::PersonRole;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (person id)
    pub sub: i64,

    /// Email at time of issue
    pub email: String,

    /// Person role
    pub role: PersonRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a person
    ///
    /// Expiration is left at zero and filled in by the JWT service when
    /// the token is signed.
    pub fn new(person_id: i64, email: &str, role: PersonRole) -> Self {
        let now = Utc::now();

        Self {
            sub: person_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: 0,
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        person_id: i64,
        email: &str,
        role: PersonRole,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: person_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.exp <= now
    }

    /// Person id carried by the token
    pub fn person_id(&self) -> i64 {
        self.sub
    }

    /// Check if the bearer has staff privileges
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Check if the bearer has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(42, "amy@example.com", PersonRole::Customer);
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, PersonRole::Customer);
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_claims_with_expiration() {
        let claims = Claims::with_expiration(7, "staff@example.com", PersonRole::Admin, 3600);
        assert!(!claims.is_expired());

        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new(1, "a@example.com", PersonRole::Customer);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_role_checks() {
        let customer = Claims::new(1, "c@example.com", PersonRole::Customer);
        assert!(!customer.is_staff());
        assert!(!customer.is_admin());

        let provider = Claims::new(2, "p@example.com", PersonRole::Provider);
        assert!(provider.is_staff());
        assert!(!provider.is_admin());

        let admin = Claims::new(3, "a@example.com", PersonRole::Admin);
        assert!(admin.is_staff());
        assert!(admin.is_admin());
    }
}
