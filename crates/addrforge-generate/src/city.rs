use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use addrforge_core::{CityRecord, CountryCatalog, OrderedMap, SubdivisionRecord};
use addrforge_data::{DataError, ReferenceStore};

/// Access to per-subdivision city data, however the catalog stores it.
pub trait CityProvider {
    /// The subdivision stored under `key`, with its cities.
    fn subdivision(&self, key: &str) -> Option<&SubdivisionRecord>;

    /// Every available subdivision in catalog order.
    fn subdivisions(&self) -> Vec<(&str, &SubdivisionRecord)>;

    /// City index for catalogs without subdivisions.
    fn flat_cities(&self) -> &OrderedMap<CityRecord>;
}

/// Cities embedded directly in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct InlineCityProvider<'a> {
    catalog: &'a CountryCatalog,
}

impl<'a> InlineCityProvider<'a> {
    pub fn new(catalog: &'a CountryCatalog) -> Self {
        Self { catalog }
    }
}

impl CityProvider for InlineCityProvider<'_> {
    fn subdivision(&self, key: &str) -> Option<&SubdivisionRecord> {
        self.catalog.subdivisions.get(key)
    }

    fn subdivisions(&self) -> Vec<(&str, &SubdivisionRecord)> {
        self.catalog.subdivisions.iter().collect()
    }

    fn flat_cities(&self) -> &OrderedMap<CityRecord> {
        &self.catalog.cities
    }
}

/// Cities fetched per subdivision from a secondary dataset.
///
/// Subdivisions are loaded by [`DeferredCityProvider::warm`] and memoized;
/// lookups only see what has been warmed, so record generation never waits
/// on the store.
#[derive(Debug)]
pub struct DeferredCityProvider<'a> {
    catalog: &'a CountryCatalog,
    country: String,
    loaded: OrderedMap<Arc<SubdivisionRecord>>,
}

impl<'a> DeferredCityProvider<'a> {
    pub fn new(catalog: &'a CountryCatalog, country: impl Into<String>) -> Self {
        Self {
            catalog,
            country: country.into(),
            loaded: OrderedMap::new(),
        }
    }

    /// Loads every listed subdivision not yet loaded.
    pub async fn warm<S>(&mut self, store: &S, keys: &[String]) -> Result<(), DataError>
    where
        S: ReferenceStore + ?Sized,
    {
        let catalog = self.catalog;
        for key in catalog.subdivisions.keys() {
            if !keys.iter().any(|wanted| wanted == key) || self.loaded.contains_key(key) {
                continue;
            }
            let region = store.load_deferred_region(&self.country, key).await?;
            debug!(country = %self.country, subdivision = %key, "deferred cities warmed");
            self.loaded.insert(key, region);
        }
        Ok(())
    }
}

impl CityProvider for DeferredCityProvider<'_> {
    fn subdivision(&self, key: &str) -> Option<&SubdivisionRecord> {
        self.loaded.get(key).map(Arc::as_ref)
    }

    fn subdivisions(&self) -> Vec<(&str, &SubdivisionRecord)> {
        self.loaded
            .iter()
            .map(|(key, region)| (key, region.as_ref()))
            .collect()
    }

    fn flat_cities(&self) -> &OrderedMap<CityRecord> {
        &self.catalog.cities
    }
}

/// City chosen for one record together with the subdivision that owns it.
#[derive(Debug, Clone, Copy)]
pub struct LocatedCity<'a> {
    /// Display name of the owning subdivision; `None` for flat catalogs.
    pub subdivision: Option<&'a str>,
    pub city: &'a CityRecord,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("city not found: {0}")]
    CityNotFound(String),
    #[error("subdivision not available: {0}")]
    UnknownSubdivision(String),
    #[error("no cities available for {0}")]
    NoCities(String),
}

/// Finds the city for one record.
///
/// Without an override a city of `subdivision` is drawn uniformly. With an
/// override the selected subdivision is checked first, then every subdivision
/// in catalog order; the first match decides the owning subdivision.
pub fn locate<'a, P, R>(
    provider: &'a P,
    subdivision: Option<&str>,
    city_override: Option<&str>,
    rng: &mut R,
) -> Result<LocatedCity<'a>, LocateError>
where
    P: CityProvider + ?Sized,
    R: Rng + ?Sized,
{
    let Some(key) = subdivision else {
        let cities = provider.flat_cities();
        let city = match city_override {
            Some(wanted) => {
                find_city(cities, wanted).ok_or_else(|| LocateError::CityNotFound(wanted.to_string()))?
            }
            None => random_city(cities, rng)
                .ok_or_else(|| LocateError::NoCities("city index".to_string()))?,
        };
        return Ok(LocatedCity {
            subdivision: None,
            city,
        });
    };

    let record = provider
        .subdivision(key)
        .ok_or_else(|| LocateError::UnknownSubdivision(key.to_string()))?;

    let Some(wanted) = city_override else {
        let city =
            random_city(&record.cities, rng).ok_or_else(|| LocateError::NoCities(key.to_string()))?;
        return Ok(LocatedCity {
            subdivision: Some(record.name.as_str()),
            city,
        });
    };

    if let Some(city) = record.cities.get(wanted) {
        return Ok(LocatedCity {
            subdivision: Some(record.name.as_str()),
            city,
        });
    }

    provider
        .subdivisions()
        .into_iter()
        .find_map(|(_, owner)| {
            find_city(&owner.cities, wanted).map(|city| LocatedCity {
                subdivision: Some(owner.name.as_str()),
                city,
            })
        })
        .ok_or_else(|| LocateError::CityNotFound(wanted.to_string()))
}

/// Exact key match first, then a case-insensitive display-name match.
fn find_city<'a>(cities: &'a OrderedMap<CityRecord>, wanted: &str) -> Option<&'a CityRecord> {
    cities.get(wanted).or_else(|| {
        let wanted = wanted.trim().to_lowercase();
        cities
            .values()
            .find(|city| city.name.to_lowercase() == wanted)
    })
}

fn random_city<'a, R: Rng + ?Sized>(
    cities: &'a OrderedMap<CityRecord>,
    rng: &mut R,
) -> Option<&'a CityRecord> {
    if cities.is_empty() {
        return None;
    }
    cities
        .get_index(rng.random_range(0..cities.len()))
        .map(|(_, city)| city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> CountryCatalog {
        let mut catalog: CountryCatalog = serde_json::from_value(serde_json::json!({
            "subdivisionKind": "state",
            "callingCode": "+1 ",
            "phoneTemplate": "(AAA) XXX-XXXX",
            "subdivisions": {
                "CA": {"name": "California", "cities": {
                    "Los Angeles": {"zipCodes": ["90001"], "areaCodes": ["213"]},
                    "San Diego": {"zipCodes": ["92101"], "areaCodes": ["619"]}
                }},
                "NY": {"name": "New York", "cities": {
                    "Buffalo": {"zipCodes": ["14201"], "areaCodes": ["716"]}
                }}
            }
        }))
        .expect("catalog");
        catalog.fill_display_names();
        catalog
    }

    #[test]
    fn random_city_belongs_to_subdivision() {
        let catalog = catalog();
        let provider = InlineCityProvider::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let located = locate(&provider, Some("CA"), None, &mut rng).expect("locate");
            assert_eq!(located.subdivision, Some("California"));
            assert!(["Los Angeles", "San Diego"].contains(&located.city.name.as_str()));
        }
    }

    #[test]
    fn override_searches_other_subdivisions() {
        let catalog = catalog();
        let provider = InlineCityProvider::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let located = locate(&provider, Some("CA"), Some("buffalo"), &mut rng).expect("locate");
        assert_eq!(located.subdivision, Some("New York"));
        assert_eq!(located.city.name, "Buffalo");
    }

    #[test]
    fn override_prefers_selected_subdivision() {
        let catalog = catalog();
        let provider = InlineCityProvider::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let located = locate(&provider, Some("CA"), Some("San Diego"), &mut rng).expect("locate");
        assert_eq!(located.subdivision, Some("California"));
    }

    #[test]
    fn unknown_override_reports_city_not_found() {
        let catalog = catalog();
        let provider = InlineCityProvider::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let err = locate(&provider, Some("NY"), Some("Gotham"), &mut rng).expect_err("missing");
        assert_eq!(err, LocateError::CityNotFound("Gotham".to_string()));
    }
}
