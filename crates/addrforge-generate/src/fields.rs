use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::Value;

use addrforge_core::{
    AddressType, CityRecord, CountryCatalog, NamePools, SubdivisionKind, TypedPool, UNAVAILABLE,
};

/// Behavior selected by a field tag; synonyms collapse to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FirstName,
    LastName,
    Email,
    Subdivision,
    City,
    ZipCode,
    Phone,
    StreetName,
    Neighborhood,
    Landmark,
    StreetNumber,
    HouseName,
    Country,
    AddressType,
    Unknown,
}

impl FieldKind {
    /// Classifies a field tag, ignoring case.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "firstname" => Self::FirstName,
            "lastname" => Self::LastName,
            "email" => Self::Email,
            "city" => Self::City,
            "zipcode" => Self::ZipCode,
            "phone" | "phoneno" => Self::Phone,
            "streetname" => Self::StreetName,
            "neighborhood" => Self::Neighborhood,
            "landmark" => Self::Landmark,
            "streetnumber" | "housenumber" | "streetno" | "houseno" | "buildingno"
            | "buildingnumber" => Self::StreetNumber,
            "housename" | "buildingname" | "building" => Self::HouseName,
            "country" => Self::Country,
            "addresstype" => Self::AddressType,
            other if SubdivisionKind::from_field_tag(other).is_some() => Self::Subdivision,
            _ => Self::Unknown,
        }
    }
}

/// Names generated for the record being built; dropped with the record.
#[derive(Debug, Clone, Default)]
pub struct NameCache {
    first: Option<String>,
    last: Option<String>,
}

/// Per-call pools and settings shared by every record.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    pub catalog: &'a CountryCatalog,
    pub address_type: AddressType,
    pub names: &'a NamePools,
    pub house_names: &'a TypedPool,
    pub landmarks: &'a TypedPool,
}

/// Values fixed for one record before its fields are resolved.
#[derive(Debug, Clone, Copy)]
pub struct RecordScope<'a> {
    pub subdivision: Option<&'a str>,
    pub city: &'a CityRecord,
    pub phone: &'a str,
}

impl FieldResolver<'_> {
    /// Resolves one field tag for the record described by `scope`.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        tag: &str,
        scope: &RecordScope<'_>,
        cache: &mut NameCache,
        rng: &mut R,
    ) -> Value {
        match FieldKind::from_tag(tag) {
            FieldKind::FirstName => Value::String(self.first_name(cache, rng).to_string()),
            FieldKind::LastName => Value::String(self.last_name(cache, rng).to_string()),
            FieldKind::Email => {
                let first = self.first_name(cache, rng).to_lowercase();
                let last = self.last_name(cache, rng).to_lowercase();
                Value::String(format!("{first}.{last}@example.com"))
            }
            FieldKind::Subdivision => text(scope.subdivision),
            FieldKind::City => Value::String(scope.city.name.clone()),
            FieldKind::ZipCode => sample(&scope.city.zip_codes, rng),
            FieldKind::Phone => Value::String(scope.phone.to_string()),
            FieldKind::StreetName => {
                sample(self.catalog.street_names.for_type(self.address_type), rng)
            }
            FieldKind::Neighborhood => {
                sample(self.catalog.neighborhoods.for_type(self.address_type), rng)
            }
            FieldKind::Landmark => sample(self.landmarks.for_type(self.address_type), rng),
            FieldKind::StreetNumber => Value::from(rng.random_range(1..=9999_u32)),
            FieldKind::HouseName => sample(self.house_names.for_type(self.address_type), rng),
            FieldKind::Country => text(self.catalog.name.as_deref()),
            FieldKind::AddressType => Value::String(self.address_type.label().to_string()),
            FieldKind::Unknown => Value::String(UNAVAILABLE.to_string()),
        }
    }

    fn first_name<'c, R: Rng + ?Sized>(&self, cache: &'c mut NameCache, rng: &mut R) -> &'c str {
        let pool = self.names.first_names(self.address_type);
        cache
            .first
            .get_or_insert_with(|| pick(pool, rng).to_string())
    }

    fn last_name<'c, R: Rng + ?Sized>(&self, cache: &'c mut NameCache, rng: &mut R) -> &'c str {
        let pool = self.names.last_names(self.address_type);
        cache
            .last
            .get_or_insert_with(|| pick(pool, rng).to_string())
    }
}

fn pick<'a, R: Rng + ?Sized>(values: &'a [String], rng: &mut R) -> &'a str {
    values
        .choose(rng)
        .map(String::as_str)
        .unwrap_or(UNAVAILABLE)
}

fn sample<R: Rng + ?Sized>(values: &[String], rng: &mut R) -> Value {
    Value::String(pick(values, rng).to_string())
}

fn text(value: Option<&str>) -> Value {
    Value::String(value.unwrap_or(UNAVAILABLE).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrforge_core::CommonPools;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn catalog() -> CountryCatalog {
        serde_json::from_value(json!({
            "name": "United States",
            "subdivisionKind": "state",
            "callingCode": "+1 ",
            "phoneTemplate": "(AAA) XXX-XXXX",
            "streetNames": {"residential": ["Elm Drive"], "industrial": ["Foundry Road"]},
            "neighborhoods": {"residential": ["Brookside"]}
        }))
        .expect("catalog")
    }

    fn common() -> CommonPools {
        CommonPools {
            names: serde_json::from_value(json!({
                "firstnames": ["Ana"],
                "lastnames": ["Costa"],
                "byType": {"corporate": {"firstnames": ["Morgan"]}}
            }))
            .expect("names"),
            landmarks: serde_json::from_value(json!({"residential": ["Near Park"]}))
                .expect("landmarks"),
            house_names: serde_json::from_value(json!(["Rose Cottage"])).expect("houses"),
            ..CommonPools::default()
        }
    }

    fn city() -> CityRecord {
        CityRecord {
            name: "Austin".to_string(),
            zip_codes: vec!["78701".to_string()],
            area_codes: vec!["512".to_string()],
        }
    }

    #[test]
    fn synonyms_share_behavior() {
        for tag in ["streetNumber", "HOUSENUMBER", "streetNo", "houseNo", "buildingNo", "buildingNumber"] {
            assert_eq!(FieldKind::from_tag(tag), FieldKind::StreetNumber, "{tag}");
        }
        for tag in ["state", "Province", "territory", "emirate", "prefecture", "district"] {
            assert_eq!(FieldKind::from_tag(tag), FieldKind::Subdivision, "{tag}");
        }
        assert_eq!(FieldKind::from_tag("phoneNo"), FieldKind::Phone);
        assert_eq!(FieldKind::from_tag("building"), FieldKind::HouseName);
        assert_eq!(FieldKind::from_tag("favouriteColor"), FieldKind::Unknown);
    }

    #[test]
    fn email_reuses_cached_names() {
        let catalog = catalog();
        let common = common();
        let resolver = FieldResolver {
            catalog: &catalog,
            address_type: AddressType::Residential,
            names: &common.names,
            house_names: &common.house_names,
            landmarks: &common.landmarks,
        };
        let city = city();
        let scope = RecordScope {
            subdivision: Some("Texas"),
            city: &city,
            phone: "+1 (512) 555-0101",
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut cache = NameCache::default();

        assert_eq!(resolver.resolve("email", &scope, &mut cache, &mut rng), json!("ana.costa@example.com"));
        assert_eq!(resolver.resolve("firstName", &scope, &mut cache, &mut rng), json!("Ana"));
        assert_eq!(cache.last.as_deref(), Some("Costa"));
    }

    #[test]
    fn pools_follow_address_type() {
        let catalog = catalog();
        let common = common();
        let resolver = FieldResolver {
            catalog: &catalog,
            address_type: AddressType::Corporate,
            names: &common.names,
            house_names: &common.house_names,
            landmarks: &common.landmarks,
        };
        let city = city();
        let scope = RecordScope {
            subdivision: None,
            city: &city,
            phone: "",
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut cache = NameCache::default();

        let resolve = |tag: &str, cache: &mut NameCache, rng: &mut ChaCha8Rng| {
            resolver.resolve(tag, &scope, cache, rng)
        };
        assert_eq!(resolve("firstName", &mut cache, &mut rng), json!("Morgan"));
        assert_eq!(resolve("lastName", &mut cache, &mut rng), json!("Costa"));
        assert_eq!(resolve("streetName", &mut cache, &mut rng), json!("Elm Drive"));
        assert_eq!(resolve("neighborhood", &mut cache, &mut rng), json!("Brookside"));
        assert_eq!(resolve("landmark", &mut cache, &mut rng), json!("Near Park"));
        assert_eq!(resolve("buildingName", &mut cache, &mut rng), json!("Rose Cottage"));
        assert_eq!(resolve("state", &mut cache, &mut rng), json!("N/A"));
        assert_eq!(resolve("country", &mut cache, &mut rng), json!("United States"));
        assert_eq!(resolve("zipCode", &mut cache, &mut rng), json!("78701"));
        assert_eq!(resolve("unknownTag", &mut cache, &mut rng), json!("N/A"));

        let number = resolve("houseNo", &mut cache, &mut rng)
            .as_u64()
            .expect("numeric street number");
        assert!((1..=9999).contains(&number));
    }
}
