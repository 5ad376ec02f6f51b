use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use addrforge_core::{AddressType, OrderedMap};

use crate::errors::GenerationError;

/// Country used when a request does not name one.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Field list used when a request asks for `all` fields or gives no list.
pub const CANONICAL_FIELDS: [&str; 13] = [
    "buildingNo",
    "buildingName",
    "streetNumber",
    "streetName",
    "neighborhood",
    "landmark",
    "city",
    "state",
    "zipCode",
    "firstName",
    "lastName",
    "phone",
    "email",
];

/// Output encoding for generated records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }
}

/// Caller restriction on which subdivisions records are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubdivisionFilter {
    All,
    Keys(Vec<String>),
}

/// Fully parsed generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub country: String,
    pub count: usize,
    pub address_type: AddressType,
    /// Requested field tags in order; duplicates allowed.
    pub fields: Vec<String>,
    /// Filters keyed by option name (`states`, `provinces`, ...).
    pub subdivision_filters: BTreeMap<String, SubdivisionFilter>,
    pub city: Option<String>,
    /// Values merged into every record after field resolution.
    pub addon: Map<String, Value>,
    /// Format name as given; checked once records exist.
    pub format: String,
    pub separator: String,
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(count: usize) -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            count,
            address_type: AddressType::default(),
            fields: CANONICAL_FIELDS.iter().map(|field| field.to_string()).collect(),
            subdivision_filters: BTreeMap::new(),
            city: None,
            addon: Map::new(),
            format: OutputFormat::default().as_str().to_string(),
            separator: ",".to_string(),
            seed: None,
        }
    }

    /// Requested fields with duplicates removed, first occurrence wins.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !columns.contains(&field.as_str()) {
                columns.push(field);
            }
        }
        columns
    }

    pub fn output_format(&self) -> Result<OutputFormat, GenerationError> {
        OutputFormat::parse(&self.format)
            .ok_or_else(|| GenerationError::UnsupportedFormat(self.format.clone()))
    }

    pub fn subdivision_filter(&self, option_key: &str) -> Option<&SubdivisionFilter> {
        self.subdivision_filters.get(option_key)
    }
}

/// One generated address: field tag to value, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AddressRecord {
    fields: OrderedMap<Value>,
}

impl AddressRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Cell text for delimited and plain output; absent fields are empty.
    pub fn cell(&self, field: &str) -> String {
        match self.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(value)) => value.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn columns_drop_duplicates_in_order() {
        let mut request = GenerationRequest::new(1);
        request.fields = vec![
            "city".to_string(),
            "phone".to_string(),
            "city".to_string(),
            "zipCode".to_string(),
        ];
        assert_eq!(request.columns(), vec!["city", "phone", "zipCode"]);
    }

    #[test]
    fn cells_render_numbers_and_missing_fields() {
        let mut record = AddressRecord::new();
        record.insert("streetNumber", json!(42));
        record.insert("city", json!("Austin"));
        assert_eq!(record.cell("streetNumber"), "42");
        assert_eq!(record.cell("city"), "Austin");
        assert_eq!(record.cell("state"), "");
    }

    #[test]
    fn unknown_format_is_reported_on_use() {
        let mut request = GenerationRequest::new(1);
        request.format = "XML".to_string();
        let err = request.output_format().expect_err("xml");
        assert!(matches!(err, GenerationError::UnsupportedFormat(name) if name == "XML"));
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(OutputFormat::parse("CSV"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
