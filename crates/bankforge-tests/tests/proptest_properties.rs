//! Property-based tests for model building and envelope conversion.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bankforge-tests --test proptest_properties
//! ```

use proptest::prelude::*;

use bankforge_backend_sf2::envelope::{
    ms_to_timecents, sustain_centibels, SUSTAIN_SILENCE_CB, TIMECENTS_MAX, TIMECENTS_MIN,
};
use bankforge_model::{
    build_bank, decay_time_ms, read_table, release_time_ms, Instrument, InstrumentTable,
    WarningCode, MAX_DECAY_RELEASE_MS, MAX_REGISTER,
};

const HEADER: &str = "InstrumentID,Type,KeyMin,KeyMax,WaveID";

fn build(rows: &[String]) -> bankforge_model::BuildResult {
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    let loaded = InstrumentTable::from_table(read_table(&csv).unwrap()).unwrap();
    build_bank(&loaded.table)
}

// ============================================================================
// 1. Range-keyed instruments
// ============================================================================

/// Key spans with a distinct wave per row, so the owner of a key is visible.
fn range_rows() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..=127, 0u8..=127), 1..10)
}

proptest! {
    /// Every key belongs to the last row whose span covers it.
    #[test]
    fn range_last_row_owns_each_key(spans in range_rows()) {
        let rows: Vec<String> = spans
            .iter()
            .enumerate()
            .map(|(i, (lo, hi))| format!("0,range,{},{},{}", lo, hi, i))
            .collect();
        let result = build(&rows);

        let Instrument::RangeKeyed(range) = result.bank.get(0) else {
            panic!("expected a range instrument");
        };

        // KeyMax below KeyMin collapses to a single key.
        let effective: Vec<(u8, u8)> = spans.iter().map(|&(lo, hi)| (lo, hi.max(lo))).collect();
        let global_min = effective.iter().map(|s| s.0).min().unwrap();
        let global_max = effective.iter().map(|s| s.1).max().unwrap();
        prop_assert_eq!(range.min_key, global_min);
        prop_assert_eq!(range.max_key(), global_max);

        for key in global_min..=global_max {
            let owner = effective
                .iter()
                .rposition(|&(lo, hi)| lo <= key && key <= hi);
            let bound = range.note_for_key(key).map(|n| n.waveform as usize);
            prop_assert_eq!(bound, owner, "key {}", key);
        }

        let overlapped = effective.iter().enumerate().any(|(i, &(lo, hi))| {
            effective[..i].iter().any(|&(plo, phi)| lo <= phi && plo <= hi)
        });
        let reported = result.warnings.iter().any(|w| w.code == WarningCode::RangeOverlap);
        prop_assert_eq!(reported, overlapped);
    }
}

// ============================================================================
// 2. Regional instruments
// ============================================================================

proptest! {
    /// Bands tile the keyboard: ascending, disjoint, ending at 127.
    #[test]
    fn regional_bands_tile_keyboard(key_maxes in prop::collection::vec(0u8..=127, 1..8)) {
        let rows: Vec<String> = key_maxes
            .iter()
            .map(|k| format!("0,regional,,{},0", k))
            .collect();
        let result = build(&rows);

        let Instrument::Regional(regional) = result.bank.get(0) else {
            panic!("expected a regional instrument");
        };
        prop_assert_eq!(regional.regions.len(), key_maxes.len());
        prop_assert_eq!(regional.regions.last().unwrap().key_max, MAX_REGISTER);
        prop_assert!(regional.regions.windows(2).all(|w| w[0].key_max <= w[1].key_max));

        let mut next = 0u16;
        for (span, _) in regional.key_spans() {
            if let Some((lo, hi)) = span {
                prop_assert_eq!(lo as u16, next);
                prop_assert!(lo <= hi);
                next = hi as u16 + 1;
            }
        }
        prop_assert_eq!(next, MAX_REGISTER as u16 + 1);

        let extended = result.warnings.iter().any(|w| w.code == WarningCode::RegionExtended);
        prop_assert_eq!(extended, *key_maxes.iter().max().unwrap() < MAX_REGISTER);
    }
}

// ============================================================================
// 3. Envelope conversion
// ============================================================================

proptest! {
    /// Decay and release split the table maximum between them.
    #[test]
    fn decay_plus_release_is_table_max(v in 0u8..=127, s in 0u8..=127) {
        let sum = decay_time_ms(v, s) + release_time_ms(v, s);
        let max = MAX_DECAY_RELEASE_MS[v as usize];
        prop_assert!(
            (sum - max).abs() <= 1e-9 * max.max(1.0),
            "v={} s={}: {} != {}", v, s, sum, max
        );
    }

    /// Timecents stay inside the generator range for any duration.
    #[test]
    fn timecents_are_clamped(ms in prop::num::f64::ANY) {
        let tc = ms_to_timecents(ms);
        prop_assert!((TIMECENTS_MIN..=TIMECENTS_MAX).contains(&tc));
    }

    /// Timecents never decrease as the duration grows.
    #[test]
    fn timecents_are_monotonic(a in 0.0f64..1.0e7, b in 0.0f64..1.0e7) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ms_to_timecents(lo) <= ms_to_timecents(hi));
    }

    /// Sustain attenuation stays between full level and silence.
    #[test]
    fn sustain_centibels_are_clamped(v in any::<u8>()) {
        let cb = sustain_centibels(v);
        prop_assert!((0..=SUSTAIN_SILENCE_CB).contains(&cb));
    }
}
