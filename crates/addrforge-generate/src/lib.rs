//! Address generation engine for addrforge.
//!
//! This crate turns a generation request into address records drawn from a
//! country catalog, keeping city, zip code and phone area code consistent
//! within each record, and renders them as JSON, CSV or plain text.

pub mod city;
pub mod engine;
pub mod errors;
pub mod fields;
pub mod model;
pub mod output;
pub mod params;
pub mod phone;
pub mod region;

pub use engine::{AddressGenerator, GenerationOutcome};
pub use errors::GenerationError;
pub use model::{AddressRecord, GenerationRequest, OutputFormat, SubdivisionFilter};
