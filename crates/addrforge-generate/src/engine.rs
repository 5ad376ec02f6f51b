use std::time::Instant;

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use addrforge_core::{CommonPools, CountryCatalog};
use addrforge_data::{CountryResolver, ReferenceStore};

use crate::city::{
    CityProvider, DeferredCityProvider, InlineCityProvider, LocateError, LocatedCity, locate,
};
use crate::errors::GenerationError;
use crate::fields::{FieldResolver, NameCache, RecordScope};
use crate::model::{AddressRecord, GenerationRequest};
use crate::output::render;
use crate::phone::synthesize;
use crate::region::{choose_candidate, select_candidates};

/// Records produced by one request, with the identifiers used to log it.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub request_id: String,
    /// Catalog key the requested country resolved to.
    pub country_key: String,
    /// Seed of the random stream; replaying it reproduces the records.
    pub seed: u64,
    pub records: Vec<AddressRecord>,
}

/// Entry point for generating addresses from a reference store.
#[derive(Debug, Clone)]
pub struct AddressGenerator<S> {
    store: S,
}

impl<S: ReferenceStore> AddressGenerator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates and renders addresses from raw caller input.
    ///
    /// Failures are returned as their message text in place of output.
    pub async fn generate(&self, count: &Value, options: &Value) -> String {
        let result = match GenerationRequest::from_options(count, options) {
            Ok(request) => self.generate_output(&request).await,
            Err(err) => Err(err),
        };
        result.unwrap_or_else(|err| {
            debug!(error = ?err, "generation request rejected");
            err.to_string()
        })
    }

    /// Generates records and renders them in the request's format.
    ///
    /// The format name is checked after the records are built, so a request
    /// naming an unknown country reports the country first.
    pub async fn generate_output(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let outcome = self.generate_records(request).await?;
        let format = request.output_format()?;
        render(
            &outcome.records,
            &request.columns(),
            format,
            &request.separator,
        )
    }

    pub async fn generate_records(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        if request.count == 0 {
            return Err(GenerationError::InvalidCount);
        }

        let start = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();

        let common = self.store.load_common_pools().await?;
        let country_key = CountryResolver::new(&common.country_map).resolve(&request.country);
        let catalog = match self.store.load_catalog(&country_key).await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    country = %request.country,
                    key = %country_key,
                    error = %err,
                    "country catalog unavailable"
                );
                return Err(GenerationError::CatalogNotFound {
                    country: request.country.clone(),
                });
            }
        };

        let filter = catalog
            .subdivision_kind
            .option_key()
            .and_then(|key| request.subdivision_filter(key));
        let candidates = select_candidates(&catalog, filter);

        let seed = request.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        info!(
            request_id = %request_id,
            country = %country_key,
            count = request.count,
            address_type = %request.address_type,
            format = %request.format,
            candidates = candidates.len(),
            seed,
            "generation started"
        );

        let context = GenerationContext {
            request,
            catalog: &catalog,
            resolver: field_resolver(&catalog, &common, request),
            candidates: &candidates,
        };

        let records = if catalog.is_deferred() {
            let mut provider = DeferredCityProvider::new(&catalog, country_key.as_str());
            let wanted = if request.city.is_some() {
                catalog.subdivisions.keys().map(str::to_string).collect()
            } else {
                candidates.clone()
            };
            if let Err(err) = provider.warm(&self.store, &wanted).await {
                warn!(
                    request_id = %request_id,
                    country = %country_key,
                    error = %err,
                    "deferred cities unavailable"
                );
                return Err(GenerationError::CatalogNotFound {
                    country: request.country.clone(),
                });
            }
            context.build(&provider, &mut rng)?
        } else {
            context.build(&InlineCityProvider::new(&catalog), &mut rng)?
        };

        info!(
            request_id = %request_id,
            country = %country_key,
            records = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "generation finished"
        );

        Ok(GenerationOutcome {
            request_id,
            country_key,
            seed,
            records,
        })
    }
}

fn field_resolver<'a>(
    catalog: &'a CountryCatalog,
    common: &'a CommonPools,
    request: &GenerationRequest,
) -> FieldResolver<'a> {
    FieldResolver {
        catalog,
        address_type: request.address_type,
        names: catalog.names.as_ref().unwrap_or(&common.names),
        house_names: catalog.house_names.as_ref().unwrap_or(&common.house_names),
        landmarks: catalog.landmarks.as_ref().unwrap_or(&common.landmarks),
    }
}

struct GenerationContext<'a> {
    request: &'a GenerationRequest,
    catalog: &'a CountryCatalog,
    resolver: FieldResolver<'a>,
    candidates: &'a [String],
}

impl GenerationContext<'_> {
    fn build<P, R>(&self, provider: &P, rng: &mut R) -> Result<Vec<AddressRecord>, GenerationError>
    where
        P: CityProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let mut records = Vec::with_capacity(self.request.count);
        let mut override_missed = false;

        for _ in 0..self.request.count {
            let subdivision = choose_candidate(self.candidates, rng);
            let located = self.locate(provider, subdivision, &mut override_missed, rng)?;

            let area_code = located.city.area_codes.choose(rng).map(String::as_str);
            let phone = synthesize(
                area_code,
                &self.catalog.calling_code,
                &self.catalog.phone_template,
                rng,
            );
            let scope = RecordScope {
                subdivision: located.subdivision,
                city: located.city,
                phone: &phone,
            };

            let mut record = AddressRecord::new();
            record.insert(
                "addressType",
                Value::String(self.request.address_type.label().to_string()),
            );
            let mut names = NameCache::default();
            for tag in &self.request.fields {
                let value = self.resolver.resolve(tag, &scope, &mut names, rng);
                record.insert(tag.as_str(), value);
            }
            for (key, value) in &self.request.addon {
                record.insert(key.as_str(), value.clone());
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Applies the city override; a city that exists nowhere falls back to a
    /// random city of the drawn subdivision.
    fn locate<'p, P, R>(
        &self,
        provider: &'p P,
        subdivision: Option<&str>,
        override_missed: &mut bool,
        rng: &mut R,
    ) -> Result<LocatedCity<'p>, GenerationError>
    where
        P: CityProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let city = self.request.city.as_deref();
        match locate(provider, subdivision, city, rng) {
            Ok(located) => Ok(located),
            Err(LocateError::CityNotFound(name)) => {
                if !*override_missed {
                    warn!(city = %name, "requested city not found; using random cities");
                    *override_missed = true;
                }
                Ok(locate(provider, subdivision, None, rng)?)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrforge_data::MemoryReferenceStore;
    use serde_json::json;

    fn store() -> MemoryReferenceStore {
        let common: CommonPools = CommonPools {
            names: serde_json::from_value(json!({
                "firstnames": ["Ana"],
                "lastnames": ["Costa"]
            }))
            .expect("names"),
            country_map: [("usa".to_string(), vec!["united states".to_string()])]
                .into_iter()
                .collect(),
            ..CommonPools::default()
        };
        let catalog: CountryCatalog = serde_json::from_value(json!({
            "name": "United States",
            "subdivisionKind": "state",
            "callingCode": "+1 ",
            "phoneTemplate": "(AAA) XXX-XXXX",
            "subdivisions": {
                "TX": {"name": "Texas", "cities": {
                    "Austin": {"zipCodes": ["78701"], "areaCodes": ["512"]}
                }}
            },
            "streetNames": ["Elm Drive"],
            "neighborhoods": ["Brookside"]
        }))
        .expect("catalog");
        MemoryReferenceStore::new(common)
            .with_catalog("usa", catalog)
            .expect("valid catalog")
    }

    #[tokio::test]
    async fn zero_count_is_rejected_before_loading() {
        let generator = AddressGenerator::new(store());
        let request = GenerationRequest::new(0);
        let err = generator
            .generate_records(&request)
            .await
            .expect_err("zero count");
        assert!(matches!(err, GenerationError::InvalidCount));
    }

    #[tokio::test]
    async fn address_type_leads_every_record() {
        let generator = AddressGenerator::new(store());
        let mut request = GenerationRequest::new(2);
        request.fields = vec!["city".to_string(), "phone".to_string()];
        let outcome = generator.generate_records(&request).await.expect("records");
        assert_eq!(outcome.country_key, "usa");
        for record in &outcome.records {
            assert_eq!(
                record.keys().collect::<Vec<_>>(),
                vec!["addressType", "city", "phone"]
            );
            assert_eq!(record.get_str("addressType"), Some("Residential"));
            assert!(record.get_str("phone").is_some_and(|phone| phone.starts_with("+1 (512) ")));
        }
    }

    #[tokio::test]
    async fn missing_deferred_region_reports_catalog_not_found() {
        let catalog: CountryCatalog = serde_json::from_value(json!({
            "subdivisionKind": "state",
            "citySource": "deferred",
            "callingCode": "+91 ",
            "phoneTemplate": "AA XXXX XXXX",
            "subdivisions": {"MH": {"name": "Maharashtra"}}
        }))
        .expect("catalog");
        let store = MemoryReferenceStore::new(CommonPools::default())
            .with_catalog("india", catalog)
            .expect("valid catalog");
        let generator = AddressGenerator::new(store);
        let mut request = GenerationRequest::new(1);
        request.country = "India".to_string();
        let err = generator
            .generate_records(&request)
            .await
            .expect_err("region missing");
        assert!(matches!(err, GenerationError::CatalogNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_city_override_falls_back() {
        let generator = AddressGenerator::new(store());
        let mut request = GenerationRequest::new(3);
        request.fields = vec!["city".to_string()];
        request.city = Some("Gotham".to_string());
        let outcome = generator.generate_records(&request).await.expect("records");
        assert!(outcome.records.iter().all(|r| r.get_str("city") == Some("Austin")));
    }
}
