//! Service catalog models
//!
//! Services, their bookable variants, and pre-purchased packages.
//! The catalog is read-only input to the scheduling engine: a variant's
//! duration determines a reservation's end time, and its active flags gate
//! whether new bookings may reference it. Existing reservations keep their
//! variant reference even after deactivation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Service entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier
    pub service_id: i64,

    /// Display name
    pub name: String,

    /// Description shown to customers
    pub description: Option<String>,

    /// Whether the service is bookable
    pub is_active: bool,
}

/// Service variant entity
///
/// A specific bookable configuration of a service: its own duration and
/// price. Reservations reference variants, not services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceVariant {
    /// Unique identifier
    pub variant_id: i64,

    /// Owning service
    pub service_id: i64,

    /// Display name (e.g., "60 min deep tissue")
    pub name: String,

    /// Duration in minutes (>= 1)
    pub duration_minutes: i32,

    /// Price for a single booking
    pub price: Decimal,

    /// Whether the variant is bookable
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

/// A variant joined with its parent service's availability state
///
/// This is the shape the scheduler resolves during booking: the variant's
/// own flag and the parent service's flag must both be true for new
/// reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantWithService {
    pub variant_id: i64,
    pub service_id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub is_active: bool,
    /// Parent service's active flag
    pub service_is_active: bool,
}

impl VariantWithService {
    /// Whether new reservations may reference this variant
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.service_is_active
    }
}

/// A service with its bookable variants, as served by the catalog listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceWithVariants {
    #[serde(flatten)]
    pub service: Service,
    pub variants: Vec<ServiceVariant>,
}

/// Package entity: a bundle of variants sold together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier
    pub package_id: i64,

    /// Display name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// Bundle price
    pub price: Option<Decimal>,

    /// Whether the package is purchasable
    pub is_active: bool,
}

/// Package item: one variant entitlement inside a package, with quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageItem {
    /// Unique identifier
    pub item_id: i64,

    /// Owning package
    pub package_id: i64,

    /// Entitled variant
    pub variant_id: i64,

    /// Number of bookings this item entitles (>= 1)
    pub quantity: i32,
}

/// A package joined with its item entitlements (catalog listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageWithItems {
    #[serde(flatten)]
    pub package: Package,
    pub items: Vec<PackageItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn variant(active: bool, service_active: bool) -> VariantWithService {
        VariantWithService {
            variant_id: 1,
            service_id: 1,
            name: "60 min massage".to_string(),
            duration_minutes: 60,
            price: dec!(80.00),
            is_active: active,
            service_is_active: service_active,
        }
    }

    #[test]
    fn test_variant_bookable() {
        assert!(variant(true, true).is_bookable());
        assert!(!variant(false, true).is_bookable());
        assert!(!variant(true, false).is_bookable());
        assert!(!variant(false, false).is_bookable());
    }

    #[test]
    fn test_package_with_items_flattens() {
        let bundle = PackageWithItems {
            package: Package {
                package_id: 7,
                name: "Relax Trio".to_string(),
                description: None,
                price: Some(dec!(200.00)),
                is_active: true,
            },
            items: vec![PackageItem {
                item_id: 1,
                package_id: 7,
                variant_id: 3,
                quantity: 3,
            }],
        };

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["package_id"], 7);
        assert_eq!(json["name"], "Relax Trio");
        assert_eq!(json["items"][0]["variant_id"], 3);
        assert_eq!(json["items"][0]["quantity"], 3);
    }
}
