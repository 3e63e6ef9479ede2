//! Person model
//!
//! Customers, providers, and administrators share one identity table.
//! A single role tag disambiguates them; the scheduler only ever refers
//! to people by id and never depends on which role backs the reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Person role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    /// A customer who books reservations
    #[default]
    Customer,
    /// A staff member who delivers services and can be booked
    Provider,
    /// An administrator with full access
    Admin,
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonRole::Customer => write!(f, "customer"),
            PersonRole::Provider => write!(f, "provider"),
            PersonRole::Admin => write!(f, "admin"),
        }
    }
}

impl PersonRole {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(PersonRole::Customer),
            "provider" => Some(PersonRole::Provider),
            "admin" => Some(PersonRole::Admin),
            _ => None,
        }
    }

    /// Check if this person can be booked as a provider
    pub fn is_provider(&self) -> bool {
        matches!(self, PersonRole::Provider)
    }

    /// Check if this person has staff privileges (manage reservations)
    pub fn is_staff(&self) -> bool {
        matches!(self, PersonRole::Provider | PersonRole::Admin)
    }

    /// Check if this person has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, PersonRole::Admin)
    }
}

/// Person entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub person_id: i64,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address (unique, used for login)
    pub email: String,

    /// Phone number
    pub phone: Option<String>,

    /// Password hash (never expose in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role tag
    pub role: PersonRole,

    /// Professional title (providers)
    pub title: Option<String>,

    /// Short biography (providers)
    pub bio: Option<String>,

    /// Whether the person is active
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl Person {
    /// Check whether this person may log in
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public-safe projection of a person used inside joined reservation records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
    pub person_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<&Person> for PersonSummary {
    fn from(p: &Person) -> Self {
        Self {
            person_id: p.person_id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            title: p.title.clone(),
        }
    }
}
