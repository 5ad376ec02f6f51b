use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use addrforge_core::{
    CommonPools, CountryCatalog, NamePools, OrderedMap, SubdivisionRecord, TypedPool,
    validate_catalog, validate_region,
};

use crate::errors::{DataError, Result};
use crate::store::ReferenceStore;

const NAMES_FILE: &str = "common/names.json";
const LANDMARKS_FILE: &str = "common/landmarks.json";
const HOUSE_NAMES_FILE: &str = "common/houseNames.json";
const COUNTRY_MAP_FILE: &str = "common/countryMap.json";

/// Reference store reading JSON datasets from a directory tree.
///
/// Layout under `root`:
/// - `common/{names,landmarks,houseNames,countryMap}.json`
/// - `countries/<key>.json`
/// - `countries/<key>/<subdivision>.json` for deferred catalogs
#[derive(Debug)]
pub struct FsReferenceStore {
    root: PathBuf,
    catalogs: AppendOnlyCache<String, CountryCatalog>,
    regions: AppendOnlyCache<(String, String), SubdivisionRecord>,
    common: AppendOnlyCache<(), CommonPools>,
}

impl FsReferenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            catalogs: AppendOnlyCache::new(),
            regions: AppendOnlyCache::new(),
            common: AppendOnlyCache::new(),
        }
    }

    /// Store over the `data/` directory bundled with the workspace.
    pub fn bundled() -> Self {
        Self::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data"))
    }

    async fn read_common_asset<T>(&self, relative: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match read_json(&self.root.join(relative)).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => {
                warn!(asset = %relative, "common asset missing; using an empty pool");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl ReferenceStore for FsReferenceStore {
    async fn load_catalog(&self, key: &str) -> Result<Arc<CountryCatalog>> {
        let key = key.to_string();
        if let Some(catalog) = self.catalogs.get(&key)? {
            return Ok(catalog);
        }

        let path = self
            .root
            .join("countries")
            .join(format!("{}.json", safe_segment(&key)?));
        let mut catalog: CountryCatalog = read_json(&path).await?;
        catalog.fill_display_names();
        validate_catalog(&catalog)?;

        debug!(
            country = %key,
            kind = %catalog.subdivision_kind,
            subdivisions = catalog.subdivisions.len(),
            deferred = catalog.is_deferred(),
            "catalog loaded"
        );
        self.catalogs.insert(key, catalog)
    }

    async fn load_common_pools(&self) -> Result<Arc<CommonPools>> {
        if let Some(common) = self.common.get(&())? {
            return Ok(common);
        }

        let names: NamePools = self.read_common_asset(NAMES_FILE).await?;
        let landmarks: TypedPool = self.read_common_asset(LANDMARKS_FILE).await?;
        let house_names: TypedPool = self.read_common_asset(HOUSE_NAMES_FILE).await?;
        let country_map: OrderedMap<Vec<String>> =
            self.read_common_asset(COUNTRY_MAP_FILE).await?;

        debug!(
            first_names = names.firstnames.len(),
            last_names = names.lastnames.len(),
            countries = country_map.len(),
            "common pools loaded"
        );
        self.common.insert(
            (),
            CommonPools {
                names,
                landmarks,
                house_names,
                country_map,
            },
        )
    }

    async fn load_deferred_region(
        &self,
        country: &str,
        subdivision: &str,
    ) -> Result<Arc<SubdivisionRecord>> {
        let key = (country.to_string(), subdivision.to_string());
        if let Some(region) = self.regions.get(&key)? {
            return Ok(region);
        }

        let path = self
            .root
            .join("countries")
            .join(safe_segment(country)?)
            .join(format!("{}.json", safe_segment(subdivision)?));
        let mut region: SubdivisionRecord = read_json(&path).await?;
        if region.name.is_empty() {
            region.name = subdivision.to_string();
        }
        region.fill_display_names();
        validate_region(subdivision, &region)?;

        debug!(
            country = %country,
            subdivision = %subdivision,
            cities = region.cities.len(),
            "deferred region loaded"
        );
        self.regions.insert(key, region)
    }
}

/// Cache that only ever grows; the first value stored for a key wins.
#[derive(Debug)]
struct AppendOnlyCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> AppendOnlyCache<K, V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn get(&self, key: &K) -> Result<Option<Arc<V>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DataError::Cache("reference cache poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn insert(&self, key: K, value: V) -> Result<Arc<V>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DataError::Cache("reference cache poisoned".to_string()))?;
        Ok(Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(value))))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Err(DataError::NotFound(path.display().to_string()));
            }
            return Err(DataError::Io {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    serde_json::from_str(&contents).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Rejects keys that would escape the data directory.
fn safe_segment(key: &str) -> Result<&str> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(DataError::NotFound(key.to_string()));
    }
    Ok(key)
}
