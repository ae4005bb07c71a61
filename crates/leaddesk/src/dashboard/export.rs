use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export")]
    Empty,
    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv buffer: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output was not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A rendered download: file name, media type, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content_type: String,
    pub body: String,
}

impl CsvExport {
    pub fn row_count(&self) -> usize {
        csv::Reader::from_reader(self.body.as_bytes())
            .records()
            .count()
    }
}

/// Serialize a uniform list to CSV.
///
/// The header is taken from the first record's field order. Every cell,
/// header included, is quoted. An empty list is rejected instead of producing a
/// header-only file.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;

    Ok(String::from_utf8(bytes)?)
}

pub fn export_filename(slug: &str, date: NaiveDate) -> String {
    format!("{slug}_{}.csv", date.format("%Y-%m-%d"))
}

pub fn export<T: Serialize>(
    records: &[T],
    slug: &str,
    date: NaiveDate,
) -> Result<CsvExport, ExportError> {
    let body = to_csv(records)?;
    let filename = export_filename(slug, date);
    info!(%filename, rows = records.len(), "csv export rendered");

    Ok(CsvExport {
        filename,
        content_type: mime::TEXT_CSV_UTF_8.to_string(),
        body,
    })
}
