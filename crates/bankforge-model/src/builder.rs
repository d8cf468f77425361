//! Instrument model building.
//!
//! Turns grouped table rows into the canonical [`InstrumentBank`]. A failing
//! instrument is reported and left as a `Null` slot; the rest of the bank is
//! still built.

use std::collections::BTreeMap;

use crate::envelope::{clamp_register, is_register, Envelope, MAX_REGISTER};
use crate::error::{Warning, WarningCode};
use crate::fields::{parse_int, row_int};
use crate::instrument::{
    Archetype, Instrument, InstrumentBank, LoopOverride, Note, NoteKind, RangeInstrument, Region,
    RegionalInstrument, SingleInstrument,
};
use crate::loader::InstrumentTable;
use crate::table::{columns, Row};

/// Result of building a bank.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub bank: InstrumentBank,
    pub warnings: Vec<Warning>,
}

/// Build the instrument bank from a loaded table.
pub fn build_bank(table: &InstrumentTable) -> BuildResult {
    let mut warnings = Vec::new();
    let Some(max_id) = table.max_id() else {
        return BuildResult {
            bank: InstrumentBank::default(),
            warnings,
        };
    };

    let mut instruments = vec![Instrument::Null; max_id as usize + 1];
    for (id, rows) in table.groups() {
        match build_instrument(id, rows, &mut warnings) {
            Ok(instrument) => instruments[id as usize] = instrument,
            Err(warning) => warnings.push(warning),
        }
    }

    BuildResult {
        bank: InstrumentBank::new(instruments),
        warnings,
    }
}

/// Build one instrument from its rows.
///
/// `Err` carries the warning explaining why the instrument was dropped;
/// non-fatal findings are appended to `warnings`.
pub fn build_instrument(
    id: u16,
    rows: &[Row],
    warnings: &mut Vec<Warning>,
) -> Result<Instrument, Warning> {
    let Some(first) = rows.first() else {
        return Ok(Instrument::Null);
    };

    let type_text = first.get(columns::TYPE).unwrap_or("");
    let archetype = Archetype::parse(type_text).ok_or_else(|| {
        Warning::for_instrument(
            WarningCode::UnknownArchetype,
            id,
            format!("unknown instrument type '{}'", type_text.trim()),
        )
        .at_line(first.line)
    })?;
    let name = first.text(columns::COMMENT).map(str::to_string);

    match archetype {
        Archetype::Null => Ok(Instrument::Null),
        Archetype::Single => {
            if rows.len() > 1 {
                warnings.push(Warning::for_instrument(
                    WarningCode::ExtraRowsIgnored,
                    id,
                    format!("{} extra row(s) ignored for single-note instrument", rows.len() - 1),
                ));
            }
            Ok(Instrument::Single(SingleInstrument {
                name,
                note: note_from_row(first),
            }))
        }
        Archetype::Regional => build_regional(id, rows, warnings)
            .map(|regions| Instrument::Regional(RegionalInstrument { name, regions })),
        Archetype::RangeKeyed => build_range(id, rows, warnings)
            .map(|(min_key, keys)| Instrument::RangeKeyed(RangeInstrument { name, min_key, keys })),
    }
}

/// Convert one row into a note definition, defaulting every missing field.
pub fn note_from_row(row: &Row) -> Note {
    Note {
        kind: NoteKind::from_text(row.get(columns::NOTE_TYPE)),
        waveform: row_int(row, columns::WAVE_ID).clamp(0, u16::MAX as i64) as u16,
        root_key: clamp_register(row_int(row, columns::ROOT_KEY)),
        envelope: Envelope::from_registers(
            row_int(row, columns::ATTACK),
            row_int(row, columns::DECAY),
            row_int(row, columns::SUSTAIN),
            row_int(row, columns::RELEASE),
            row_int(row, columns::PAN),
        ),
        loop_override: LoopOverride::from_text(row.get(columns::LOOP_OVERRIDE)),
    }
}

fn parse_key(raw: &str) -> Option<u8> {
    parse_int(Some(raw))
        .filter(|v| is_register(*v))
        .map(|v| v as u8)
}

fn build_regional(
    id: u16,
    rows: &[Row],
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Region>, Warning> {
    let mut regions = Vec::with_capacity(rows.len());
    for row in rows {
        let key_max = match row.text(columns::KEY_MAX) {
            None => MAX_REGISTER,
            Some(raw) => parse_key(raw).ok_or_else(|| {
                Warning::for_instrument(
                    WarningCode::InvalidKeyBound,
                    id,
                    format!("invalid KeyMax '{}', instrument skipped", raw),
                )
                .at_line(row.line)
            })?,
        };
        regions.push(Region {
            key_max,
            note: note_from_row(row),
        });
    }

    // Stable: bands sharing a KeyMax keep input order.
    regions.sort_by_key(|r| r.key_max);

    if let Some(last) = regions.last_mut() {
        if last.key_max < MAX_REGISTER {
            warnings.push(Warning::for_instrument(
                WarningCode::RegionExtended,
                id,
                format!("last region extended from {} to {}", last.key_max, MAX_REGISTER),
            ));
            last.key_max = MAX_REGISTER;
        }
    }

    Ok(regions)
}

fn build_range(
    id: u16,
    rows: &[Row],
    warnings: &mut Vec<Warning>,
) -> Result<(u8, Vec<Option<Note>>), Warning> {
    let mut key_table: BTreeMap<u8, Note> = BTreeMap::new();

    for row in rows {
        let (raw_min, raw_max) = match (row.text(columns::KEY_MIN), row.text(columns::KEY_MAX)) {
            (None, None) => continue,
            (Some(min), None) => (min, min),
            (None, Some(max)) => (max, max),
            (Some(min), Some(max)) => (min, max),
        };
        let (Some(min), Some(max)) = (parse_key(raw_min), parse_key(raw_max)) else {
            warnings.push(
                Warning::for_instrument(
                    WarningCode::InvalidKeyBound,
                    id,
                    format!("invalid key bounds '{}'..'{}', row skipped", raw_min, raw_max),
                )
                .at_line(row.line),
            );
            continue;
        };
        let max = max.max(min);

        // Later rows win on shared keys.
        let note = note_from_row(row);
        let overwritten: Vec<u8> = (min..=max)
            .filter(|key| key_table.insert(*key, note).is_some())
            .collect();

        if let (Some(first), Some(last)) = (overwritten.first(), overwritten.last()) {
            warnings.push(
                Warning::for_instrument(
                    WarningCode::RangeOverlap,
                    id,
                    format!(
                        "{} key(s) in {}..={} overwritten by a later row",
                        overwritten.len(),
                        first,
                        last
                    ),
                )
                .at_line(row.line),
            );
        }
    }

    let (Some(&min_key), Some(&max_key)) = (key_table.keys().next(), key_table.keys().next_back())
    else {
        return Err(Warning::for_instrument(
            WarningCode::NoUsableRows,
            id,
            "range instrument has no rows with key bounds, instrument skipped",
        ));
    };

    let keys = (min_key..=max_key)
        .map(|key| key_table.get(&key).copied())
        .collect();
    Ok((min_key, keys))
}
