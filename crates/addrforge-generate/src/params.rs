use serde_json::{Map, Value};
use tracing::debug;

use addrforge_core::{AddressType, SubdivisionKind};

use crate::errors::GenerationError;
use crate::model::{CANONICAL_FIELDS, GenerationRequest, SubdivisionFilter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    StringList,
    Object,
    UnsignedInt,
}

#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub key: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn new(key: &'static str, kind: ParamKind) -> Self {
        Self { key, kind }
    }
}

/// Request options understood by the generator, besides subdivision filters.
pub const REQUEST_PARAMS: [ParamSpec; 8] = [
    ParamSpec::new("country", ParamKind::String),
    ParamSpec::new("addressType", ParamKind::String),
    ParamSpec::new("addressFormat", ParamKind::StringList),
    ParamSpec::new("city", ParamKind::String),
    ParamSpec::new("format", ParamKind::String),
    ParamSpec::new("separator", ParamKind::String),
    ParamSpec::new("addon", ParamKind::Object),
    ParamSpec::new("seed", ParamKind::UnsignedInt),
];

pub struct ParamMap<'a> {
    map: Option<&'a Map<String, Value>>,
}

/// Checks the option object against `specs`.
///
/// Null values count as absent. Keys without a spec are ignored, so callers
/// may pass options meant for other tools.
pub fn validate_params<'a>(
    params: &'a Value,
    specs: &[ParamSpec],
) -> Result<ParamMap<'a>, GenerationError> {
    let map = match params {
        Value::Null => None,
        Value::Object(map) => Some(map),
        _ => {
            return Err(GenerationError::InvalidOption(
                "options must be a JSON object".to_string(),
            ));
        }
    };

    if let Some(map) = map {
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            match specs.iter().find(|spec| spec.key == key.as_str()) {
                Some(spec) => validate_kind(key, spec.kind, value)?,
                None => debug!(option = %key, "ignoring unknown option"),
            }
        }
    }

    Ok(ParamMap { map })
}

impl<'a> ParamMap<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_object(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// A string list; a bare string is read as a one-element list.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            Value::String(value) => Some(vec![value.clone()]),
            Value::Array(values) => Some(
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

fn validate_kind(key: &str, kind: ParamKind, value: &Value) -> Result<(), GenerationError> {
    let valid = match kind {
        ParamKind::String => value.is_string(),
        ParamKind::StringList => {
            value.is_string()
                || value
                    .as_array()
                    .is_some_and(|values| values.iter().all(Value::is_string))
        }
        ParamKind::Object => value.is_object(),
        ParamKind::UnsignedInt => value.as_u64().is_some(),
    };

    if valid {
        Ok(())
    } else {
        Err(GenerationError::InvalidOption(format!(
            "invalid value for option '{key}'"
        )))
    }
}

/// Reads a positive whole record count.
pub fn parse_count(value: &Value) -> Result<usize, GenerationError> {
    value
        .as_u64()
        .filter(|count| *count > 0)
        .and_then(|count| usize::try_from(count).ok())
        .ok_or(GenerationError::InvalidCount)
}

impl GenerationRequest {
    /// Builds a request from a raw count and a JSON option object.
    pub fn from_options(count: &Value, options: &Value) -> Result<Self, GenerationError> {
        let count = parse_count(count)?;
        let mut specs = REQUEST_PARAMS.to_vec();
        specs.extend(
            SubdivisionKind::NAMED
                .iter()
                .filter_map(|kind| kind.option_key())
                .map(|key| ParamSpec::new(key, ParamKind::StringList)),
        );
        let params = validate_params(options, &specs)?;

        let mut request = GenerationRequest::new(count);

        if let Some(country) = params.get_str("country") {
            request.country = country.to_string();
        }

        if let Some(value) = params.get_str("addressType") {
            request.address_type = AddressType::parse(value).ok_or_else(|| {
                GenerationError::InvalidOption(format!("unknown address type '{value}'"))
            })?;
        }

        if let Some(fields) = params.get_str_list("addressFormat") {
            request.fields = expand_fields(fields);
        }

        if let Some(value) = params.get_str("format") {
            request.format = value.to_string();
        }

        if let Some(separator) = params.get_str("separator") {
            request.separator = separator.to_string();
        }

        request.city = params.get_str("city").map(str::to_string);
        request.seed = params.get_u64("seed");
        if let Some(addon) = params.get_object("addon") {
            request.addon = addon.clone();
        }

        for kind in SubdivisionKind::NAMED {
            let Some(option_key) = kind.option_key() else {
                continue;
            };
            if let Some(keys) = params.get_str_list(option_key)
                && let Some(filter) = parse_filter(keys)
            {
                request
                    .subdivision_filters
                    .insert(option_key.to_string(), filter);
            }
        }

        Ok(request)
    }
}

/// `all` anywhere in the list selects the canonical field list. An explicit
/// empty list stays empty.
fn expand_fields(fields: Vec<String>) -> Vec<String> {
    if fields.iter().any(|field| field.eq_ignore_ascii_case("all")) {
        return CANONICAL_FIELDS
            .iter()
            .map(|field| field.to_string())
            .collect();
    }
    fields
}

/// Empty lists impose no filter; a leading `all` selects every subdivision.
fn parse_filter(keys: Vec<String>) -> Option<SubdivisionFilter> {
    let first = keys.first()?;
    if first.trim().eq_ignore_ascii_case("all") {
        return Some(SubdivisionFilter::All);
    }
    Some(SubdivisionFilter::Keys(keys))
}
