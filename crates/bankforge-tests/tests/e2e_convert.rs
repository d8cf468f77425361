//! End-to-end conversion tests.
//!
//! Each test writes an instrument table (and optionally a sample folder) to
//! a temporary directory, runs the full pipeline and inspects the output
//! files with the independent format validators.

use bankforge_backend_sbnk::SbnkEncoder;
use bankforge_backend_sf2::envelope::{ms_to_timecents, sustain_centibels};
use bankforge_cli::commands::convert::ConvertOptions;
use bankforge_model::{
    attack_ms, build_bank, decay_time_ms, read_table, release_time_ms, sustain_fraction,
    InstrumentTable, NativeBankEncoder, ATTACK_TIME_MS, MAX_DECAY_RELEASE_MS,
};
use bankforge_tests::fixtures::{ramp, BankFixture};
use bankforge_tests::format_validators::Sf2Info;
use bankforge_tests::harness::{run_convert, validate_sbnk_file, validate_sf2_file};
use pretty_assertions::assert_eq;

// =============================================================================
// Helpers
// =============================================================================

const HEADER: &str =
    "InstrumentID,Type,KeyMin,KeyMax,NoteType,WaveID,RootKey,Attack,Decay,Sustain,Release,Pan,LoopOverride,Comment";

const GEN_KEY_RANGE: u16 = 43;
const GEN_SAMPLE_ID: u16 = 53;
const GEN_ATTACK: u16 = 34;
const GEN_SUSTAIN: u16 = 37;
const GEN_LOOP_MODE: u16 = 54;

fn u16_at(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([buf[pos], buf[pos + 1]])
}

fn table(rows: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

/// Amount of one generator in a zone.
fn generator(info: &Sf2Info, zone: usize, oper: u16) -> u16 {
    info.zone_generators(zone)
        .iter()
        .find(|g| g.oper == oper)
        .unwrap_or_else(|| panic!("zone {} has no generator {}", zone, oper))
        .amount
}

// =============================================================================
// Native bank
// =============================================================================

#[test]
fn test_single_row_without_samples() {
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table("bank.csv", &table(&["0,simple,,,,0,60,127,127,127,127,64,,"]));
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    run.assert_success();
    assert_eq!(run.warning_codes(), vec!["W301"]);
    assert!(run.report.sf2.is_none());
    assert!(!options.sf2_path.exists());

    let (bytes, info) = validate_sbnk_file(&options.sbnk_path);
    assert_eq!(info.records.len(), 1);
    let record = info.records[0];
    assert_eq!(record.kind, 1);

    let body = record.offset as usize;
    assert_eq!(u16_at(&bytes, body), 0);
    // root key, attack, decay, sustain, release, pan
    assert_eq!(&bytes[body + 4..body + 10], &[60, 127, 127, 127, 127, 64]);
}

#[test]
fn test_range_overlap_later_row_wins() {
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,range,0,2,,10,50,100,100,100,100,64,,A",
            "0,range,2,4,,20,70,110,110,110,110,64,,B",
        ]),
    );
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    run.assert_success();
    assert!(run.has_warning("W206"));

    let (bytes, info) = validate_sbnk_file(&options.sbnk_path);
    let record = info.records[0];
    assert_eq!(record.kind, 16);
    let body = record.offset as usize;
    assert_eq!((bytes[body], bytes[body + 1]), (0, 4));

    let entry = |key: usize| body + 2 + key * 12;
    let wave = |key: usize| u16_at(&bytes, entry(key) + 2);
    let root = |key: usize| bytes[entry(key) + 6];

    assert_eq!((wave(1), root(1)), (10, 50));
    assert_eq!((wave(2), root(2)), (20, 70));
    assert_eq!((wave(3), root(3)), (20, 70));
}

#[test]
fn test_native_bank_matches_direct_encoding() {
    let csv = table(&[
        "0,simple,,,,4,60,127,120,100,90,64,,Piano",
        "2,psg,,,square,3,69,127,127,127,127,40,,Lead",
        "3,regional,,40,,1,48,127,127,127,127,64,,",
        "3,regional,,127,noise,0,60,127,127,127,127,64,,",
        "5,range,36,38,,7,36,127,127,127,127,64,,",
        "5,range,40,40,,8,40,127,127,127,127,64,,",
    ]);
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table("bank.csv", &csv);
    let options = ConvertOptions::for_input(&input);
    run_convert(&options).assert_success();
    let (written, info) = validate_sbnk_file(&options.sbnk_path);

    let loaded = InstrumentTable::from_table(read_table(&csv).unwrap()).unwrap();
    let built = build_bank(&loaded.table);
    let direct = SbnkEncoder::default().encode(&built.bank).unwrap();

    assert_eq!(written, direct);
    let kinds: Vec<u8> = info.records.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![1, 0, 2, 17, 0, 16]);
}

#[test]
fn test_regional_last_band_reaches_top_key() {
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,regional,,90,,1,60,127,127,127,127,64,,",
            "0,regional,,30,,0,60,127,127,127,127,64,,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    run.assert_success();
    assert!(run.has_warning("W204"));

    let (bytes, info) = validate_sbnk_file(&options.sbnk_path);
    let record = info.records[0];
    assert_eq!(record.kind, 17);
    let body = record.offset as usize;
    assert_eq!(&bytes[body..body + 8], &[30, 127, 0, 0, 0, 0, 0, 0]);
    // Bands are sorted: wave 0 first
    assert_eq!(u16_at(&bytes, body + 8 + 2), 0);
    assert_eq!(u16_at(&bytes, body + 8 + 12 + 2), 1);
}

#[test]
fn test_bad_rows_are_reported_not_fatal() {
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "#0,simple,,,,0,60,127,127,127,127,64,,",
            "x,simple,,,,0,60,127,127,127,127,64,,",
            "1,bogus,,,,0,60,127,127,127,127,64,,",
            "2,simple,,,,0,60,127,127,127,127,64,,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    run.assert_success();
    let codes = run.warning_codes();
    assert!(codes.contains(&"W102"));
    assert!(codes.contains(&"W101"));
    assert!(codes.contains(&"W201"));

    let (_, info) = validate_sbnk_file(&options.sbnk_path);
    let kinds: Vec<u8> = info.records.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![0, 0, 1]);
}

#[test]
fn test_missing_required_column_is_input_error() {
    let fixture = BankFixture::without_samples();
    let input = fixture.write_table("bank.csv", "InstrumentID,WaveID\n0,1\n");
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    let failure = run.outcome.as_ref().unwrap_err();
    assert_eq!(failure.error().code, "CLI_001");
    assert!(!options.sbnk_path.exists());
}

// =============================================================================
// Envelope tables
// =============================================================================

#[test]
fn test_envelope_table_boundaries() {
    assert_eq!(attack_ms(127), 0.0);
    assert_eq!(attack_ms(0), ATTACK_TIME_MS[0]);
    assert_eq!(sustain_fraction(0), 0.0);
    assert_eq!(sustain_fraction(127), 1.0);
}

#[test]
fn test_decay_plus_release_is_max() {
    for v in 0..=127u8 {
        for s in [0u8, 1, 31, 64, 100, 126, 127] {
            let sum = decay_time_ms(v, s) + release_time_ms(v, s);
            let max = MAX_DECAY_RELEASE_MS[v as usize];
            assert!(
                (sum - max).abs() <= 1e-9 * max.max(1.0),
                "v={} s={}: {} != {}",
                v,
                s,
                sum,
                max
            );
        }
    }
}

// =============================================================================
// SoundFont
// =============================================================================

#[test]
fn test_sf2_counts_follow_instruments_and_samples() {
    let fixture = BankFixture::new();
    fixture.add_sample("00_sine.wav", &ramp(100), 32000, None);
    fixture.add_sample("01_saw.wav", &ramp(60), 16000, Some((10, 20)));
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,simple,,,,0,60,127,127,127,127,64,,Lead",
            "1,regional,,60,,0,60,127,127,127,127,64,,",
            "1,regional,,127,,1,72,127,127,127,127,64,,",
            "2,psg,,,Square,3,60,127,127,127,127,64,,",
            "3,simple,,,,9,60,127,127,127,127,64,,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);

    let run = run_convert(&options);
    run.assert_success();
    let codes = run.warning_codes();
    assert!(codes.contains(&"W304"));
    assert!(codes.contains(&"W302"));
    assert!(codes.contains(&"W306"));

    let info = validate_sf2_file(&options.sf2_path);
    // Two unique samples plus the terminal record
    assert_eq!(info.samples.len(), 3);
    // Instruments 0 and 1 have regions; 2 (PSG) and 3 (missing sample) do not
    assert_eq!(info.presets.len(), 3);
    assert_eq!(info.instruments.len(), 3);
    assert_eq!(info.presets[0].name, "Lead");
    assert_eq!(info.presets[1].name, "Inst001");
    assert_eq!(info.presets[1].program, 1);
    assert_eq!(info.presets.last().unwrap().name, "EOP");
    assert_eq!(info.samples.last().unwrap().name, "EOS");
    assert_eq!(info.name, "bank");

    assert_eq!(run.report.sf2_presets, 2);
    assert_eq!(run.report.sf2_samples, 2);
}

#[test]
fn test_sf2_loop_end_is_exclusive() {
    let fixture = BankFixture::new();
    fixture.add_sample("00_pad.wav", &ramp(80), 22050, None);
    fixture.add_sample("01_loop.wav", &ramp(40), 22050, Some((10, 20)));
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,simple,,,,0,60,127,127,127,127,64,,",
            "1,simple,,,,1,60,127,127,127,127,64,,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);
    run_convert(&options).assert_success();

    let info = validate_sf2_file(&options.sf2_path);
    let looped = &info.samples[1];
    assert_eq!(looped.start, 80);
    assert_eq!(looped.end, 120);
    assert_eq!(looped.loop_start, looped.start + 10);
    assert_eq!(looped.loop_end, looped.start + 21);

    // Auto loop mode follows the declared loop
    let zones = info.instrument_zones(1);
    assert_eq!(generator(&info, zones.start, GEN_LOOP_MODE), 1);
    assert_eq!(generator(&info, info.instrument_zones(0).start, GEN_LOOP_MODE), 0);
}

#[test]
fn test_sf2_loop_override_wins() {
    let fixture = BankFixture::new();
    fixture.add_sample("00_loop.wav", &ramp(40), 22050, Some((4, 30)));
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,simple,,,,0,60,127,127,127,127,64,off,",
            "1,simple,,,,0,60,127,127,127,127,64,yes,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);
    run_convert(&options).assert_success();

    let info = validate_sf2_file(&options.sf2_path);
    assert_eq!(info.samples.len(), 2);
    assert_eq!(generator(&info, info.instrument_zones(0).start, GEN_LOOP_MODE), 0);
    assert_eq!(generator(&info, info.instrument_zones(1).start, GEN_LOOP_MODE), 1);
}

#[test]
fn test_sf2_range_regions_and_envelope() {
    let fixture = BankFixture::new();
    fixture.add_sample("00_kick.wav", &ramp(50), 32000, None);
    fixture.add_sample("01_snare.wav", &ramp(50), 32000, None);
    let input = fixture.write_table(
        "bank.csv",
        &table(&[
            "0,range,36,36,,0,36,40,127,90,127,64,,",
            "0,range,38,38,,1,38,127,127,127,127,64,,",
        ]),
    );
    let options = ConvertOptions::for_input(&input);
    run_convert(&options).assert_success();

    let info = validate_sf2_file(&options.sf2_path);
    let zones = info.instrument_zones(0);
    // The silent placeholder at key 37 has no zone
    assert_eq!(zones.len(), 2);
    let ranges: Vec<(u8, u8)> = zones
        .clone()
        .map(|z| {
            info.zone_generators(z)
                .iter()
                .find(|g| g.oper == GEN_KEY_RANGE)
                .unwrap()
                .range()
        })
        .collect();
    assert_eq!(ranges, vec![(36, 36), (38, 38)]);

    let first = zones.start;
    assert_eq!(generator(&info, first, GEN_SAMPLE_ID), 0);
    assert_eq!(generator(&info, first + 1, GEN_SAMPLE_ID), 1);
    assert_eq!(
        generator(&info, first, GEN_ATTACK) as i16,
        ms_to_timecents(ATTACK_TIME_MS[40])
    );
    assert_eq!(
        generator(&info, first, GEN_SUSTAIN) as i16,
        sustain_centibels(90)
    );
    assert_eq!(generator(&info, first + 1, GEN_SUSTAIN), 0);
}

#[test]
fn test_skip_sf2_writes_only_native_bank() {
    let fixture = BankFixture::new();
    fixture.add_sample("00_a.wav", &ramp(10), 8000, None);
    let input = fixture.write_table("bank.csv", &table(&["0,simple,,,,0,60,127,127,127,127,64,,"]));
    let mut options = ConvertOptions::for_input(&input);
    options.skip_sf2 = true;

    let run = run_convert(&options);
    run.assert_success();
    assert!(run.warning_codes().is_empty());
    assert!(options.sbnk_path.exists());
    assert!(!options.sf2_path.exists());
}
