//! Tabular import file reader.
//!
//! Files are UTF-8 with an optional BOM. The header row is discarded and
//! every field is trimmed. Rows may have different widths.

use super::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// One data row with its 1-based line number in the source file.
#[derive(Debug, Clone)]
pub(crate) struct ImportRow {
    pub line: u64,
    pub fields: StringRecord,
}

impl ImportRow {
    /// Returns field `index` or a `MalformedRow` error naming `column`.
    pub fn field(&self, path: &Path, index: usize, column: &str) -> ImportResult<&str> {
        self.fields.get(index).ok_or_else(|| ImportError::MalformedRow {
            path: path.to_path_buf(),
            line: self.line,
            message: format!("missing `{column}` column"),
        })
    }

    /// Parses field `index` as a number.
    pub fn parse_field<T: std::str::FromStr>(
        &self,
        path: &Path,
        index: usize,
        column: &str,
    ) -> ImportResult<T> {
        let raw = self.field(path, index, column)?;
        raw.parse::<T>().map_err(|_| ImportError::MalformedRow {
            path: path.to_path_buf(),
            line: self.line,
            message: format!("`{column}` is not a valid number: `{raw}`"),
        })
    }

    /// Fields from `start` onward.
    pub fn trailing(&self, start: usize) -> impl Iterator<Item = &str> {
        self.fields.iter().skip(start)
    }
}

/// Reads every data row of `path`.
pub(crate) fn read_rows(path: &Path) -> ImportResult<Vec<ImportRow>> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let fields = record.map_err(|source| ImportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = fields.position().map_or(0, |position| position.line());
        rows.push(ImportRow { line, fields });
    }
    Ok(rows)
}
