use csv::{ReaderBuilder, StringRecord};
use eyre::{Context, Result};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("row {line}: missing column {column}")]
    MissingColumn { line: usize, column: usize },
    #[error("row {line}: invalid thread count {value:?}")]
    InvalidThreadCount { line: usize, value: String },
    #[error("row {line}: invalid measurement {value:?} in column {column}")]
    InvalidMeasurement {
        line: usize,
        column: usize,
        value: String,
    },
}

/// One benchmark log row: `label, x, y[, z]`
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRecord {
    pub label: String,
    /// Thread count
    pub x: u32,
    pub y: f64,
    pub z: Option<f64>,
}

impl BenchRecord {
    /// Converts a raw row, `line` is the 1-based row number used in errors
    pub fn from_row(row: &StringRecord, line: usize) -> Result<Self, RecordError> {
        let field = |column: usize| {
            row.get(column)
                .ok_or(RecordError::MissingColumn { line, column })
        };
        let label = field(0)?.to_owned();

        let x_raw = field(1)?;
        let x = x_raw
            .trim()
            .parse::<u32>()
            .map_err(|_| RecordError::InvalidThreadCount {
                line,
                value: x_raw.to_owned(),
            })?;

        let y = parse_measurement(field(2)?, line, 2)?;
        let z = match row.get(3) {
            Some(raw) if !raw.trim().is_empty() => Some(parse_measurement(raw, line, 3)?),
            _ => None,
        };

        Ok(Self { label, x, y, z })
    }
}

fn parse_measurement(raw: &str, line: usize, column: usize) -> Result<f64, RecordError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| RecordError::InvalidMeasurement {
            line,
            column,
            value: raw.to_owned(),
        })
}

/// Reads headerless, comma separated rows without interpreting them.
///
/// Rows may carry three or four fields, blank lines are skipped.
pub fn parse_rows(text: &str) -> Result<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .from_reader(text.as_bytes());

    reader
        .records()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Read CSV row {}", i + 1)))
        .collect()
}
