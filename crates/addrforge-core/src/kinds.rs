use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Address type gating which value pools are sampled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    #[default]
    Residential,
    Industrial,
    Corporate,
}

impl AddressType {
    /// Case-insensitive parse of `residential`, `industrial` or `corporate`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "residential" => Some(Self::Residential),
            "industrial" => Some(Self::Industrial),
            "corporate" => Some(Self::Corporate),
            _ => None,
        }
    }

    /// Pool key used in reference datasets.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Industrial => "industrial",
            Self::Corporate => "corporate",
        }
    }

    /// Label written into generated records.
    pub fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Industrial => "Industrial",
            Self::Corporate => "Corporate",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AddressType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| Error::UnknownTag {
            kind: "address type",
            value: value.to_string(),
        })
    }
}

/// First-level administrative subdivision used by a country catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubdivisionKind {
    State,
    Province,
    Territory,
    County,
    Region,
    Community,
    Municipality,
    Governorate,
    Prefecture,
    District,
    Emirate,
    /// The country has no subdivisions; cities live in a flat index.
    None,
}

impl SubdivisionKind {
    /// Every kind that names a real subdivision.
    pub const NAMED: [SubdivisionKind; 11] = [
        Self::State,
        Self::Province,
        Self::Territory,
        Self::County,
        Self::Region,
        Self::Community,
        Self::Municipality,
        Self::Governorate,
        Self::Prefecture,
        Self::District,
        Self::Emirate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Province => "province",
            Self::Territory => "territory",
            Self::County => "county",
            Self::Region => "region",
            Self::Community => "community",
            Self::Municipality => "municipality",
            Self::Governorate => "governorate",
            Self::Prefecture => "prefecture",
            Self::District => "district",
            Self::Emirate => "emirate",
            Self::None => "none",
        }
    }

    /// Request option carrying the subdivision filter for this kind.
    pub fn option_key(self) -> Option<&'static str> {
        match self {
            Self::State => Some("states"),
            Self::Province => Some("provinces"),
            Self::Territory => Some("territories"),
            Self::County => Some("counties"),
            Self::Region => Some("regions"),
            Self::Community => Some("communities"),
            Self::Municipality => Some("municipalities"),
            Self::Governorate => Some("governorates"),
            Self::Prefecture => Some("prefectures"),
            Self::District => Some("districts"),
            Self::Emirate => Some("emirates"),
            Self::None => None,
        }
    }

    /// Maps a lowercased field tag (`state`, `province`, ...) to its kind.
    pub fn from_field_tag(tag: &str) -> Option<Self> {
        Self::NAMED.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Normalizes a caller-supplied subdivision key to the dataset's casing.
    ///
    /// State catalogs are keyed by upper-case postal codes; every other kind
    /// is keyed by name and compared as given.
    pub fn normalize_key(self, key: &str) -> String {
        match self {
            Self::State => key.trim().to_uppercase(),
            _ => key.trim().to_string(),
        }
    }
}

impl fmt::Display for SubdivisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_type_parse_is_case_insensitive() {
        assert_eq!(AddressType::parse("Corporate"), Some(AddressType::Corporate));
        assert_eq!(AddressType::parse(" INDUSTRIAL "), Some(AddressType::Industrial));
        assert_eq!(AddressType::parse("retail"), None);
        assert!("retail".parse::<AddressType>().is_err());
    }

    #[test]
    fn state_keys_are_upper_cased() {
        assert_eq!(SubdivisionKind::State.normalize_key("ca"), "CA");
        assert_eq!(SubdivisionKind::Province.normalize_key("Jawa Barat"), "Jawa Barat");
    }

    #[test]
    fn field_tags_map_to_kinds() {
        assert_eq!(
            SubdivisionKind::from_field_tag("emirate"),
            Some(SubdivisionKind::Emirate)
        );
        assert_eq!(SubdivisionKind::from_field_tag("none"), None);
        assert_eq!(SubdivisionKind::Territory.option_key(), Some("territories"));
        assert_eq!(SubdivisionKind::None.option_key(), None);
    }
}
