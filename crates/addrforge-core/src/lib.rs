//! Core contracts and helpers for addrforge.
//!
//! This crate defines the reference-data types (country catalogs, subdivisions,
//! cities and value pools), the address-type and subdivision-kind tags, and the
//! catalog validation shared by the data store, the generator and the CLI.

pub mod catalog;
pub mod error;
pub mod kinds;
pub mod ordered;
pub mod validation;

pub use catalog::{
    CityRecord, CitySource, CommonPools, CountryCatalog, NamePools, NameSet, SubdivisionRecord,
    TypedPool,
};
pub use error::{Error, Result};
pub use kinds::{AddressType, SubdivisionKind};
pub use ordered::OrderedMap;
pub use validation::{validate_catalog, validate_region};

/// Placeholder emitted for any value that cannot be resolved.
pub const UNAVAILABLE: &str = "N/A";
