use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kinds::{AddressType, SubdivisionKind};
use crate::ordered::OrderedMap;

/// Static reference dataset for one country.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryCatalog {
    /// Display name of the country, when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Kind of first-level subdivision used by this country.
    pub subdivision_kind: SubdivisionKind,
    /// Subdivisions keyed by their lookup key, in dataset order.
    #[serde(default)]
    pub subdivisions: OrderedMap<SubdivisionRecord>,
    /// Flat city index for countries without subdivisions.
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub cities: OrderedMap<CityRecord>,
    /// Where per-subdivision city data lives.
    #[serde(default)]
    pub city_source: CitySource,
    #[serde(default)]
    pub street_names: TypedPool,
    #[serde(default)]
    pub neighborhoods: TypedPool,
    /// Country-specific house names; the common pool is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_names: Option<TypedPool>,
    /// Country-specific landmarks; the common pool is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<TypedPool>,
    /// Country-specific name pools; the common pools are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<NamePools>,
    /// International calling prefix written before every phone number.
    pub calling_code: String,
    /// Phone layout: `A` marks the area-code slot, `X` a random digit.
    pub phone_template: String,
}

impl CountryCatalog {
    /// Fills missing display names from their map keys.
    pub fn fill_display_names(&mut self) {
        for (key, subdivision) in self.subdivisions.iter_mut() {
            if subdivision.name.is_empty() {
                subdivision.name = key.to_string();
            }
            subdivision.fill_display_names();
        }
        fill_city_names(&mut self.cities);
    }

    pub fn is_deferred(&self) -> bool {
        self.city_source == CitySource::Deferred
    }
}

/// A first-level subdivision and its cities.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SubdivisionRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cities: OrderedMap<CityRecord>,
}

impl SubdivisionRecord {
    pub fn fill_display_names(&mut self) {
        fill_city_names(&mut self.cities);
    }
}

/// A city with the postal and dialing codes that belong to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zip_codes: Vec<String>,
    #[serde(default)]
    pub area_codes: Vec<String>,
}

/// Storage strategy for per-subdivision city data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CitySource {
    /// Cities are embedded in each subdivision record.
    #[default]
    Inline,
    /// Cities are stored in a secondary dataset keyed by subdivision.
    Deferred,
}

/// A value pool either shared by all address types or split per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TypedPool {
    Shared(Vec<String>),
    ByType(BTreeMap<AddressType, Vec<String>>),
}

impl Default for TypedPool {
    fn default() -> Self {
        Self::Shared(Vec::new())
    }
}

impl TypedPool {
    /// Values for `address_type`, falling back to the residential pool.
    pub fn for_type(&self, address_type: AddressType) -> &[String] {
        match self {
            Self::Shared(values) => values,
            Self::ByType(pools) => pools
                .get(&address_type)
                .filter(|values| !values.is_empty())
                .or_else(|| pools.get(&AddressType::Residential))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }
}

/// First and last name lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NameSet {
    #[serde(default)]
    pub firstnames: Vec<String>,
    #[serde(default)]
    pub lastnames: Vec<String>,
}

/// Name pools with optional per-address-type overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamePools {
    #[serde(default)]
    pub firstnames: Vec<String>,
    #[serde(default)]
    pub lastnames: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_type: BTreeMap<AddressType, NameSet>,
}

impl NamePools {
    pub fn first_names(&self, address_type: AddressType) -> &[String] {
        self.by_type
            .get(&address_type)
            .map(|set| set.firstnames.as_slice())
            .filter(|names| !names.is_empty())
            .unwrap_or(&self.firstnames)
    }

    pub fn last_names(&self, address_type: AddressType) -> &[String] {
        self.by_type
            .get(&address_type)
            .map(|set| set.lastnames.as_slice())
            .filter(|names| !names.is_empty())
            .unwrap_or(&self.lastnames)
    }
}

/// Pools shared by every country.
#[derive(Debug, Clone, Default)]
pub struct CommonPools {
    pub names: NamePools,
    pub landmarks: TypedPool,
    pub house_names: TypedPool,
    /// Canonical country key to the aliases that resolve to it.
    pub country_map: OrderedMap<Vec<String>>,
}

fn fill_city_names(cities: &mut OrderedMap<CityRecord>) {
    for (key, city) in cities.iter_mut() {
        if city.name.is_empty() {
            city.name = key.to_string();
        }
    }
}
