use std::collections::BTreeSet;

use crate::catalog::{CityRecord, CountryCatalog, SubdivisionRecord};
use crate::error::{Error, Result};
use crate::kinds::SubdivisionKind;
use crate::ordered::OrderedMap;

/// Validate internal consistency of a country catalog.
///
/// This checks:
/// - countries without subdivisions carry a flat city index
/// - other countries carry at least one subdivision, with cities when inline
/// - every city has at least one zip code
/// - the phone template has at least one digit slot
pub fn validate_catalog(catalog: &CountryCatalog) -> Result<()> {
    if !catalog.phone_template.contains('X') {
        return Err(Error::InvalidCatalog(format!(
            "phone template has no digit slots: {}",
            catalog.phone_template
        )));
    }

    if catalog.subdivision_kind == SubdivisionKind::None {
        if catalog.cities.is_empty() {
            return Err(Error::InvalidCatalog(
                "catalog without subdivisions needs a city index".to_string(),
            ));
        }
        return validate_cities("(country)", &catalog.cities);
    }

    if catalog.subdivisions.is_empty() {
        return Err(Error::InvalidCatalog(format!(
            "catalog of kind {} has no subdivisions",
            catalog.subdivision_kind
        )));
    }

    let mut names = BTreeSet::new();
    for (key, subdivision) in catalog.subdivisions.iter() {
        if !names.insert(subdivision.name.as_str()) {
            return Err(Error::InvalidCatalog(format!(
                "duplicate subdivision name: {}",
                subdivision.name
            )));
        }
        if catalog.is_deferred() {
            continue;
        }
        if subdivision.cities.is_empty() {
            return Err(Error::InvalidCatalog(format!(
                "subdivision has no cities: {key}"
            )));
        }
        validate_cities(key, &subdivision.cities)?;
    }

    Ok(())
}

/// Validate a subdivision loaded on its own, as deferred catalogs do.
pub fn validate_region(owner: &str, region: &SubdivisionRecord) -> Result<()> {
    if region.cities.is_empty() {
        return Err(Error::InvalidCatalog(format!(
            "subdivision has no cities: {owner}"
        )));
    }
    validate_cities(owner, &region.cities)
}

/// Validate the cities of one subdivision.
pub fn validate_cities(owner: &str, cities: &OrderedMap<CityRecord>) -> Result<()> {
    for (key, city) in cities.iter() {
        if city.zip_codes.is_empty() {
            return Err(Error::InvalidCatalog(format!(
                "city has no zip codes: {owner}.{key}"
            )));
        }
    }
    Ok(())
}
