use crate::errors::GenerationError;
use crate::model::AddressRecord;

/// Header row plus one row per record, rows separated by `\n`.
///
/// Single-byte separators go through the `csv` writer, which quotes values
/// only when they contain the separator, quotes or line breaks. Longer
/// separators are joined literally.
pub fn render_delimited(
    records: &[AddressRecord],
    columns: &[&str],
    separator: &str,
) -> Result<String, GenerationError> {
    match separator.as_bytes() {
        [delimiter] => write_csv(records, columns, *delimiter),
        _ => Ok(join_literal(records, columns, separator)),
    }
}

fn write_csv(
    records: &[AddressRecord],
    columns: &[&str],
    delimiter: u8,
) -> Result<String, GenerationError> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'));

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(encode_row(&builder, columns)?);
    for record in records {
        let row: Vec<String> = columns.iter().map(|column| record.cell(column)).collect();
        lines.push(encode_row(&builder, &row)?);
    }
    Ok(lines.join("\n"))
}

/// One row without its terminator. Rows with no content stay empty; the
/// writer would otherwise emit `""` for them.
fn encode_row<T: AsRef<[u8]>>(
    builder: &csv::WriterBuilder,
    row: &[T],
) -> Result<String, GenerationError> {
    let blank = match row {
        [] => true,
        [cell] => cell.as_ref().is_empty(),
        _ => false,
    };
    if blank {
        return Ok(String::new());
    }

    let mut writer = builder.from_writer(Vec::new());
    writer.write_record(row)?;
    writer.flush().map_err(csv::Error::from)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut line = String::from_utf8_lossy(&bytes).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

fn join_literal(records: &[AddressRecord], columns: &[&str], separator: &str) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(columns.join(separator));
    for record in records {
        let row: Vec<String> = columns.iter().map(|column| record.cell(column)).collect();
        lines.push(row.join(separator));
    }
    lines.join("\n")
}
