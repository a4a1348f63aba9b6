use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use log::{debug, warn};
use tempfile::NamedTempFile;
use crate::error::StoreError;
use crate::transaction::Transaction;

const FIELDS_PER_RECORD: usize = 5;

#[derive(Debug, Default)]
pub struct ParsedTransactions {
    pub transactions: Vec<Transaction>,
    pub skipped: usize,
}

/// Parses backing-file records, one transaction per line.
/// Records that do not have exactly five fields or fail to parse are skipped.
/// Only I/O failures of the underlying reader are returned as errors.
pub fn parse_transactions(reader: impl Read) -> io::Result<ParsedTransactions> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut parsed = ParsedTransactions::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => match e.into_kind() {
                csv::ErrorKind::Io(source) => return Err(source),
                kind => {
                    warn!("Failed to read a line of the transactions file: {:?}. Skipping invalid record.", kind);
                    parsed.skipped += 1;
                    continue;
                }
            },
        };
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != FIELDS_PER_RECORD {
            warn!("Line {} has {} fields, expected {}. Skipping invalid record.", line, record.len(), FIELDS_PER_RECORD);
            parsed.skipped += 1;
            continue;
        }

        match record.deserialize::<Transaction>(None) {
            Ok(transaction) => parsed.transactions.push(transaction),
            Err(e) => {
                warn!("Failed to parse line {}: {}. Skipping invalid record.", line, e);
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}

/// Reads the backing file. A missing file reads as an empty transaction list.
pub fn read_transactions(path: &Path) -> Result<ParsedTransactions, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No transactions file at {}, starting empty.", path.display());
            return Ok(ParsedTransactions::default());
        }
        Err(source) => return Err(StoreError::Read { path: path.to_path_buf(), source }),
    };
    parse_transactions(file).map_err(|source| StoreError::Read { path: path.to_path_buf(), source })
}

/// Serializes transactions as unquoted comma-separated lines.
/// Fields containing a comma or a line break are written as-is and will not read back intact.
pub fn format_transactions<W: Write>(writer: W, transactions: &[Transaction]) -> Result<W, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for transaction in transactions {
        writer.serialize(transaction)?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

/// Replaces the backing file with a snapshot of `transactions`.
///
/// The snapshot is written to a temporary file next to `path` and renamed over it,
/// so a failed write leaves the previous snapshot untouched.
pub fn write_transactions(path: &Path, transactions: &[Transaction]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source| StoreError::Write { path: path.to_path_buf(), source };

    let temp_file = NamedTempFile::new_in(dir).map_err(write_error)?;
    let mut temp_file = format_transactions(temp_file, transactions)?;
    temp_file.flush().map_err(write_error)?;
    temp_file.persist(path).map_err(|e| write_error(e.error))?;

    debug!("Saved {} transactions to {}", transactions.len(), path.display());
    Ok(())
}
