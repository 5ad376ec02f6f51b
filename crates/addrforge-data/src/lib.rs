//! Reference data store for addrforge.
//!
//! Catalogs, common pools and deferred subdivision datasets are loaded once
//! and cached for the lifetime of the store. The generator only sees the
//! [`ReferenceStore`] trait, so tests can swap the filesystem store for the
//! in-memory one.

pub mod errors;
pub mod fs;
pub mod memory;
pub mod resolver;
pub mod store;

pub use errors::{DataError, Result};
pub use fs::FsReferenceStore;
pub use memory::MemoryReferenceStore;
pub use resolver::CountryResolver;
pub use store::ReferenceStore;
