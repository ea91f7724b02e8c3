use std::io::Read;

use super::label::SentimentLabel;
use super::summary::DistributionSummary;
use crate::core::{Result, SentimentError};

/// Column holding the text to classify.
pub const SENTENCE_COLUMN: &str = "Sentence";
/// Column written with the predicted label.
pub const PREDICTION_COLUMN: &str = "Predicted sentiment";

/// A header row plus string records, as read from a CSV upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl BatchTable {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    /// A single-column table with a `Sentence` header.
    pub fn from_sentences<I, S>(sentences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: vec![SENTENCE_COLUMN.to_string()],
            records: sentences.into_iter().map(|s| vec![s.into()]).collect(),
        }
    }

    /// Reads a headed CSV. Records may differ in length; every cell must be
    /// valid UTF-8.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .byte_headers()?
            .iter()
            .map(|h| {
                String::from_utf8(h.to_vec())
                    .map_err(|_| SentimentError::Schema("header row is not valid UTF-8".into()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::new();
        for (i, record) in reader.byte_records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| {
                    String::from_utf8(cell.to_vec()).map_err(|e| SentimentError::InvalidRow {
                        row: i + 1,
                        reason: format!("cell is not valid UTF-8: {e}"),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            records.push(row);
        }

        tracing::debug!(columns = headers.len(), rows = records.len(), "read batch table");
        Ok(Self { headers, records })
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(bytes)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of column `name`, one per record, in order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| SentimentError::Schema(format!("missing required column {name:?}")))?;
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                record.get(index).map(String::as_str).ok_or_else(|| {
                    SentimentError::Schema(format!(
                        "row {} has {} cells, no {name:?} value",
                        i + 1,
                        record.len()
                    ))
                })
            })
            .collect()
    }

    /// Writes `values` into column `name`, replacing it if present and
    /// appending it otherwise. Short records are padded with empty cells.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.records.len() {
            return Err(SentimentError::Schema(format!(
                "column {name:?} has {} values for {} rows",
                values.len(),
                self.records.len()
            )));
        }
        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };
        for (record, value) in self.records.iter_mut().zip(values) {
            if record.len() <= index {
                record.resize(index + 1, String::new());
            }
            record[index] = value;
        }
        Ok(())
    }

    /// Serializes with the header row first; every record is padded to the
    /// header width.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        let width = self.headers.len();
        for record in &self.records {
            if record.len() >= width {
                writer.write_record(record)?;
            } else {
                let mut padded = record.clone();
                padded.resize(width, String::new());
                writer.write_record(&padded)?;
            }
        }
        writer
            .into_inner()
            .map_err(|e| SentimentError::Io(e.into_error()))
    }
}

/// Result of a batch prediction: the labelled table, the labels in row
/// order, and their distribution.
#[derive(Debug, Clone)]
pub struct BatchPrediction {
    pub table: BatchTable,
    pub labels: Vec<SentimentLabel>,
    pub summary: DistributionSummary,
}
