//! CSV table reading.
//!
//! Instrument tables are usually exported from a spreadsheet, so the reader
//! tolerates a UTF-8 byte order mark, CRLF line endings, quoted fields and
//! short rows. Column names are canonicalized so that common spellings
//! (`InstID`) resolve to the same column as the documented ones.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::SchemaError;

/// Column names understood by the model builder.
pub mod columns {
    pub const INSTRUMENT_ID: &str = "InstrumentID";
    pub const TYPE: &str = "Type";
    pub const KEY_MIN: &str = "KeyMin";
    pub const KEY_MAX: &str = "KeyMax";
    pub const NOTE_TYPE: &str = "NoteType";
    pub const WAVE_ID: &str = "WaveID";
    pub const ROOT_KEY: &str = "RootKey";
    pub const ATTACK: &str = "Attack";
    pub const DECAY: &str = "Decay";
    pub const SUSTAIN: &str = "Sustain";
    pub const RELEASE: &str = "Release";
    pub const PAN: &str = "Pan";
    pub const LOOP_OVERRIDE: &str = "LoopOverride";
    pub const COMMENT: &str = "Comment";

    /// Map an alternative header spelling onto its canonical column name.
    pub fn canonical(name: &str) -> &str {
        match name {
            "InstID" => INSTRUMENT_ID,
            "WaveformRef" => WAVE_ID,
            "NoteKind" => NOTE_TYPE,
            "DisplayName" => COMMENT,
            other => other,
        }
    }
}

/// One record of the instrument table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Source line of the record (header is line 1).
    pub line: usize,
    fields: BTreeMap<String, String>,
}

impl Row {
    /// Build a row from column/value pairs.
    pub fn from_pairs<K, V>(line: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (columns::canonical(k.as_ref().trim()).to_string(), v.into()))
            .collect();
        Self { line, fields }
    }

    /// Raw text of a column, if the column exists in this row.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Trimmed text of a column, `None` when absent or blank.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A parsed table: canonical header plus records.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Canonical column names in header order.
    pub columns: Vec<String>,
    /// Data records in input order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Whether the header declares a column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Read a table from a file on disk.
pub fn read_table_file(path: &Path) -> Result<Table, SchemaError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    read_table(&text)
}

/// Parse CSV text into a [`Table`].
///
/// Blank records are dropped. Records shorter than the header simply lack the
/// trailing columns; extra fields are ignored.
pub fn read_table(text: &str) -> Result<Table, SchemaError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let records = split_records(text)?;

    let mut records = records.into_iter();
    let (_, header) = records.next().ok_or(SchemaError::Empty)?;
    let columns: Vec<String> = header
        .iter()
        .map(|h| columns::canonical(h.trim()).to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(SchemaError::Empty);
    }

    let rows = records
        .filter(|(_, fields)| fields.iter().any(|f| !f.trim().is_empty()))
        .map(|(line, fields)| Row {
            line,
            fields: columns
                .iter()
                .zip(fields)
                .filter(|(c, _)| !c.is_empty())
                .map(|(c, f)| (c.clone(), f))
                .collect(),
        })
        .collect();

    Ok(Table { columns, rows })
}

/// Split CSV text into records, each tagged with the line it starts on.
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, SchemaError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                quote_line = line;
            }
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SchemaError::UnterminatedQuote(quote_line));
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}
