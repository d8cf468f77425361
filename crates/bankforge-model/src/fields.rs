//! Loose field coercion for table rows.
//!
//! Every numeric column goes through [`parse_int_or_default`]: blank or
//! non-numeric text falls back to the column's entry in [`FIELD_DEFAULTS`].

use crate::table::{columns, Row};

/// Parse an integer, falling back to `default` on blank or malformed input.
pub fn parse_int_or_default(raw: Option<&str>, default: i64) -> i64 {
    parse_int(raw).unwrap_or(default)
}

/// Parse an integer, `None` on blank or malformed input.
///
/// Integral decimals such as `60.0` are accepted; spreadsheet exports write
/// numeric columns that way.
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

/// Default values for the optional numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefaults {
    pub root_key: i64,
    pub attack: i64,
    pub decay: i64,
    pub sustain: i64,
    pub release: i64,
    pub pan: i64,
    pub wave_id: i64,
}

/// The single default table applied to every row.
pub const FIELD_DEFAULTS: FieldDefaults = FieldDefaults {
    root_key: 60,
    attack: 127,
    decay: 127,
    sustain: 127,
    release: 127,
    pan: 64,
    wave_id: 0,
};

impl FieldDefaults {
    /// Default for a column, `None` for columns without one.
    pub fn for_column(&self, column: &str) -> Option<i64> {
        match column {
            columns::ROOT_KEY => Some(self.root_key),
            columns::ATTACK => Some(self.attack),
            columns::DECAY => Some(self.decay),
            columns::SUSTAIN => Some(self.sustain),
            columns::RELEASE => Some(self.release),
            columns::PAN => Some(self.pan),
            columns::WAVE_ID => Some(self.wave_id),
            _ => None,
        }
    }
}

/// Read a defaulted numeric column from a row.
pub fn row_int(row: &Row, column: &str) -> i64 {
    let default = FIELD_DEFAULTS.for_column(column).unwrap_or(0);
    parse_int_or_default(row.get(column), default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_or_default() {
        assert_eq!(parse_int_or_default(Some("42"), 7), 42);
        assert_eq!(parse_int_or_default(Some(" -3 "), 7), -3);
        assert_eq!(parse_int_or_default(Some(""), 7), 7);
        assert_eq!(parse_int_or_default(Some("  "), 7), 7);
        assert_eq!(parse_int_or_default(Some("1.5"), 7), 7);
        assert_eq!(parse_int_or_default(Some("60.0"), 7), 60);
        assert_eq!(parse_int_or_default(Some("nan"), 7), 7);
        assert_eq!(parse_int_or_default(Some("inf"), 7), 7);
        assert_eq!(parse_int_or_default(Some("abc"), 7), 7);
        assert_eq!(parse_int_or_default(None, 7), 7);
    }

    #[test]
    fn test_row_int_uses_column_defaults() {
        let row = Row::from_pairs(2, [("Attack", "12"), ("Decay", "x"), ("Pan", "")]);
        assert_eq!(row_int(&row, columns::ATTACK), 12);
        assert_eq!(row_int(&row, columns::DECAY), 127);
        assert_eq!(row_int(&row, columns::PAN), 64);
        assert_eq!(row_int(&row, columns::ROOT_KEY), 60);
        assert_eq!(row_int(&row, columns::WAVE_ID), 0);
    }
}
