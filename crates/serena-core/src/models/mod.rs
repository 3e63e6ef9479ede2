//! Domain models for the booking system

pub mod catalog;
pub mod person;
pub mod reservation;

pub use catalog::{
    Package, PackageItem, PackageWithItems, Service, ServiceVariant, ServiceWithVariants,
    VariantWithService,
};
pub use person::{Person, PersonRole, PersonSummary};
pub use reservation::{
    BookedSlot, Reservation, ReservationDetail, ReservationStatus, ServiceSummary, VariantSummary,
};
