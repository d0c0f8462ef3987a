use crate::api::poller::ResultPage;
use crate::error::UpsqlError;
use serde_json::Value;
use std::io::Write;
use std::str::FromStr;

/// Supported renderings of a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Tsv,
    Toon,
}

impl FromStr for OutputFormat {
    type Err = UpsqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "toon" => Ok(OutputFormat::Toon),
            other => Err(UpsqlError::Config {
                message: format!(
                    "unsupported output format \"{other}\" (supported: json, csv, tsv, toon)"
                ),
            }),
        }
    }
}

/// Render one page. `first` tells delimited formats to emit a header row.
pub fn render_page(page: &ResultPage, format: OutputFormat, first: bool) -> Result<String, UpsqlError> {
    match format {
        OutputFormat::Json => to_json(page),
        OutputFormat::Csv => to_delimited(page, b',', first),
        OutputFormat::Tsv => to_delimited(page, b'\t', first),
        OutputFormat::Toon => to_toon(page),
    }
}

/// One pretty-printed JSON object per row.
pub fn to_json(page: &ResultPage) -> Result<String, UpsqlError> {
    let mut out = String::new();
    for row in &page.rows {
        let text = serde_json::to_string_pretty(row).map_err(|e| UpsqlError::Format {
            message: e.to_string(),
        })?;
        out.push_str(&text);
        out.push('\n');
    }
    Ok(out)
}

/// RFC 4180 output with the given field delimiter.
pub fn to_delimited(page: &ResultPage, delimiter: u8, header: bool) -> Result<String, UpsqlError> {
    let mut buf = Vec::new();
    write_delimited_to_writer(page, delimiter, header, &mut buf)?;
    String::from_utf8(buf).map_err(|e| UpsqlError::Format {
        message: e.to_string(),
    })
}

pub fn write_delimited_to_writer<W: Write>(
    page: &ResultPage,
    delimiter: u8,
    header: bool,
    writer: W,
) -> Result<(), UpsqlError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    let csv_err = |e: csv::Error| UpsqlError::Format {
        message: format!("CSV write error: {}", e),
    };

    if header && !page.columns.is_empty() {
        wtr.write_record(&page.columns).map_err(csv_err)?;
    }
    for row in &page.rows {
        let record = page
            .columns
            .iter()
            .map(|col| cell_text(row.get(col).unwrap_or(&Value::Null)));
        wtr.write_record(record).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Convert a page to a TOON-formatted string.
pub fn to_toon(page: &ResultPage) -> Result<String, UpsqlError> {
    // toon_format can't infer columns from an empty array, so the header is
    // produced manually for zero-row pages.
    if page.rows.is_empty() {
        if page.columns.is_empty() {
            return Ok(String::new());
        }
        return Ok(format!("[0]{{{}}}:\n", page.columns.join(",")));
    }

    let array = Value::Array(page.rows.iter().cloned().map(Value::Object).collect());
    let mut toon = toon_format::encode_default(&array).map_err(|e| UpsqlError::Format {
        message: e.to_string(),
    })?;
    if !toon.ends_with('\n') {
        toon.push('\n');
    }
    Ok(toon)
}

/// Text for a single delimited cell: nulls are empty, strings are bare,
/// everything else is compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
