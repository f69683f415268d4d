//! CSV export of transaction tables and admin record lists.
//!
//! Every field is quoted. Embedded quotes are doubled and embedded commas
//! or newlines stay inside their quoted field, so the output always parses
//! back to the same table.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::api::types::{FraudulentRecord, Transaction};

/// Header of the admin export.
pub const RECORD_HEADER: [&str; 5] = ["Transaction ID", "Merchant", "Fraud Type", "Text", "Status"];

/// A CSV document plus the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

impl CsvExport {
    /// Write into `dir` under the suggested file name, or to `path` directly
    /// when it is not a directory.
    pub fn save(&self, path: &Path) -> Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&target, &self.contents)
            .with_context(|| format!("failed to write {}", target.display()))?;
        Ok(target)
    }

    /// Number of lines including the header.
    pub fn line_count(&self) -> usize {
        self.contents.lines().count()
    }
}

/// Encode transactions with the first record's keys as the header.
///
/// Returns `None` for an empty list: there is nothing to name the columns by.
pub fn transactions_csv(transactions: &[Transaction]) -> Result<Option<String>> {
    let Some(first) = transactions.first() else {
        return Ok(None);
    };
    let header: Vec<&str> = first.keys().collect();

    let mut writer = writer();
    writer
        .write_record(&header)
        .context("failed to write CSV header")?;
    for txn in transactions {
        writer
            .write_record(header.iter().map(|key| txn.field(key)))
            .context("failed to write CSV row")?;
    }

    finish(writer).map(Some)
}

/// Encode admin records with the fixed five-column header.
pub fn records_csv(records: &[FraudulentRecord]) -> Result<String> {
    let mut writer = writer();
    writer
        .write_record(RECORD_HEADER)
        .context("failed to write CSV header")?;
    for record in records {
        writer
            .write_record([
                record.transaction_id.as_deref().unwrap_or(""),
                record.merchant_name.as_deref().unwrap_or(""),
                record.fraud_type.as_deref().unwrap_or(""),
                record.captured_text.as_deref().unwrap_or(""),
                record.status_label(),
            ])
            .context("failed to write CSV row")?;
    }
    finish(writer)
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
