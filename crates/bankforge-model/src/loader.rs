//! Instrument table loading: schema checks and grouping rows by instrument.

use std::collections::BTreeMap;

use crate::error::{SchemaError, Warning, WarningCode};
use crate::fields::parse_int;
use crate::table::{columns, Row, Table};

/// Prefix marking a commented-out row in the InstrumentID column.
pub const COMMENT_PREFIX: char = '#';

/// Rows grouped by instrument ID.
///
/// Groups are ordered by ID; rows inside a group keep their input order, which
/// regional sorting and range conflict resolution both depend on.
#[derive(Debug, Clone, Default)]
pub struct InstrumentTable {
    groups: BTreeMap<u16, Vec<Row>>,
}

/// Result of loading a table.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub table: InstrumentTable,
    /// Rows skipped while grouping.
    pub warnings: Vec<Warning>,
}

impl InstrumentTable {
    /// Validate the schema of a parsed table and group its rows.
    pub fn from_table(table: Table) -> Result<LoadResult, SchemaError> {
        if table.columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        for required in [columns::INSTRUMENT_ID, columns::TYPE] {
            if !table.has_column(required) {
                return Err(SchemaError::MissingColumn(required));
            }
        }
        if table.rows.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut groups: BTreeMap<u16, Vec<Row>> = BTreeMap::new();
        let mut warnings = Vec::new();

        for row in table.rows {
            let Some(raw_id) = row.text(columns::INSTRUMENT_ID) else {
                warnings.push(
                    Warning::new(WarningCode::InvalidInstrumentId, "blank InstrumentID, row skipped")
                        .at_line(row.line),
                );
                continue;
            };

            if raw_id.starts_with(COMMENT_PREFIX) {
                warnings.push(
                    Warning::new(WarningCode::CommentedRow, "commented row skipped").at_line(row.line),
                );
                continue;
            }

            match parse_int(Some(raw_id)).and_then(|v| u16::try_from(v).ok()) {
                Some(id) => groups.entry(id).or_default().push(row),
                None => warnings.push(
                    Warning::new(
                        WarningCode::InvalidInstrumentId,
                        format!("invalid InstrumentID '{}', row skipped", raw_id),
                    )
                    .at_line(row.line),
                ),
            }
        }

        Ok(LoadResult {
            table: InstrumentTable { groups },
            warnings,
        })
    }

    /// Highest declared instrument ID.
    pub fn max_id(&self) -> Option<u16> {
        self.groups.keys().next_back().copied()
    }

    /// Rows of one instrument.
    pub fn rows(&self, id: u16) -> Option<&[Row]> {
        self.groups.get(&id).map(Vec::as_slice)
    }

    /// Groups in ascending ID order.
    pub fn groups(&self) -> impl Iterator<Item = (u16, &[Row])> {
        self.groups.iter().map(|(id, rows)| (*id, rows.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
