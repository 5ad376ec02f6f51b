use std::sync::Arc;

use async_trait::async_trait;

use addrforge_core::{CommonPools, CountryCatalog, SubdivisionRecord};

use crate::errors::Result;

/// Trait implemented by sources of reference data.
///
/// Implementations cache what they load; returned values are shared and
/// read-only.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Loads the catalog for a canonical country key.
    ///
    /// Returns [`crate::DataError::NotFound`] when no dataset exists.
    async fn load_catalog(&self, key: &str) -> Result<Arc<CountryCatalog>>;

    /// Loads name, landmark and house-name pools plus the country alias map.
    async fn load_common_pools(&self) -> Result<Arc<CommonPools>>;

    /// Loads the cities of one subdivision of a deferred catalog.
    async fn load_deferred_region(
        &self,
        country: &str,
        subdivision: &str,
    ) -> Result<Arc<SubdivisionRecord>>;
}
