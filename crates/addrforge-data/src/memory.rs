use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use addrforge_core::{
    CommonPools, CountryCatalog, SubdivisionRecord, validate_catalog, validate_region,
};

use crate::errors::{DataError, Result};
use crate::store::ReferenceStore;

/// Reference store backed by values built in memory.
#[derive(Debug, Default)]
pub struct MemoryReferenceStore {
    catalogs: HashMap<String, Arc<CountryCatalog>>,
    regions: HashMap<(String, String), Arc<SubdivisionRecord>>,
    common: Arc<CommonPools>,
    region_loads: AtomicUsize,
}

impl MemoryReferenceStore {
    pub fn new(common: CommonPools) -> Self {
        Self {
            common: Arc::new(common),
            ..Self::default()
        }
    }

    /// Adds a catalog after filling display names and validating it.
    pub fn with_catalog(mut self, key: &str, mut catalog: CountryCatalog) -> Result<Self> {
        catalog.fill_display_names();
        validate_catalog(&catalog)?;
        self.catalogs.insert(key.to_string(), Arc::new(catalog));
        Ok(self)
    }

    /// Adds a deferred region after filling display names and validating it.
    pub fn with_region(
        mut self,
        country: &str,
        subdivision: &str,
        mut region: SubdivisionRecord,
    ) -> Result<Self> {
        region.fill_display_names();
        validate_region(subdivision, &region)?;
        self.regions.insert(
            (country.to_string(), subdivision.to_string()),
            Arc::new(region),
        );
        Ok(self)
    }

    /// Number of deferred region loads served so far.
    pub fn region_loads(&self) -> usize {
        self.region_loads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn load_catalog(&self, key: &str) -> Result<Arc<CountryCatalog>> {
        self.catalogs
            .get(key)
            .cloned()
            .ok_or_else(|| DataError::NotFound(key.to_string()))
    }

    async fn load_common_pools(&self) -> Result<Arc<CommonPools>> {
        Ok(Arc::clone(&self.common))
    }

    async fn load_deferred_region(
        &self,
        country: &str,
        subdivision: &str,
    ) -> Result<Arc<SubdivisionRecord>> {
        self.region_loads.fetch_add(1, Ordering::Relaxed);
        self.regions
            .get(&(country.to_string(), subdivision.to_string()))
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("{country}/{subdivision}")))
    }
}
