pub mod csv;

use crate::errors::GenerationError;
use crate::model::{AddressRecord, OutputFormat};

/// Renders records in the requested encoding.
///
/// JSON carries every field of every record; CSV and text carry only
/// `columns`, in order, with absent fields left empty.
pub fn render(
    records: &[AddressRecord],
    columns: &[&str],
    format: OutputFormat,
    separator: &str,
) -> Result<String, GenerationError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => csv::render_delimited(records, columns, separator),
        OutputFormat::Text => Ok(render_text(records, columns)),
    }
}

fn render_text(records: &[AddressRecord], columns: &[&str]) -> String {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.cell(column))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
