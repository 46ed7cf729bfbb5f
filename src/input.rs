//! Reading log lines from plain text and CSV sources.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Column read when none is given. Also the only name that falls back to the
/// last column when missing from the header.
pub const DEFAULT_COLUMN: &str = "message";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("error reading CSV header: input is empty")]
    MissingHeader,
    #[error("column '{column}' not found in CSV header. Available columns: {available:?}")]
    MissingColumn { column: String, available: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub column: String,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { column: DEFAULT_COLUMN.to_string(), delimiter: b',' }
    }
}

/// Non-empty lines of a text source. Invalid UTF-8 is replaced rather than
/// rejected.
pub fn read_text_lines<R: BufRead>(mut reader: R) -> Result<Vec<String>, InputError> {
    let mut out = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if !line.is_empty() {
            out.push(line.to_string());
        }
    }
    Ok(out)
}

/// Values of one column of a delimited source, trimmed, empty values dropped.
///
/// The first record is the header. Column lookup ignores case and
/// surrounding whitespace. When the requested column is [`DEFAULT_COLUMN`]
/// and the header lacks it, the last column is used instead. Rows too short
/// to hold the column and rows the reader cannot decode are skipped.
pub fn read_csv_column<R: Read>(reader: R, options: &CsvOptions) -> Result<Vec<String>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(String::is_empty) {
        return Err(InputError::MissingHeader);
    }
    let index = match header.iter().position(|c| c.eq_ignore_ascii_case(&options.column)) {
        Some(i) => i,
        None if options.column.eq_ignore_ascii_case(DEFAULT_COLUMN) => {
            let i = header.len() - 1;
            warn!(column = %options.column, using = %header[i], index = i, "column not found, using last column");
            i
        }
        None => {
            return Err(InputError::MissingColumn { column: options.column.clone(), available: header });
        }
    };

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(error = %e, "skipping malformed CSV row");
                continue;
            }
        };
        if let Some(value) = record.get(index).filter(|v| !v.is_empty()) {
            out.push(value.to_string());
        }
    }
    Ok(out)
}

/// Reads `path`, with `-` meaning stdin. Files ending in `.csv` (any case)
/// go through [`read_csv_column`]; everything else is plain text.
pub fn read_path(path: &str, options: &CsvOptions) -> Result<Vec<String>, InputError> {
    if path == "-" {
        let stdin = io::stdin();
        return read_text_lines(stdin.lock());
    }
    let file = File::open(path).map_err(|source| InputError::Open { path: path.to_string(), source })?;
    let is_csv = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_csv_column(file, options)
    } else {
        read_text_lines(BufReader::new(file))
    }
}
