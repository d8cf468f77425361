//! Envelope register values and their time/level domain.
//!
//! The source hardware stores attack, decay, sustain and release as 0-127
//! register values whose timing is non-linear. Two empirical tables map a
//! register to milliseconds; the level domain follows a quadratic volume law.
//!
//! Target-format units (timecents, centibels) live with the SF2 backend.

use serde::Serialize;

/// Highest register value.
pub const MAX_REGISTER: u8 = 127;

/// Register value for a centered pan.
pub const PAN_CENTER: u8 = 64;

/// Clamp an arbitrary integer into the 0-127 register range.
pub fn clamp_register(value: i64) -> u8 {
    value.clamp(0, MAX_REGISTER as i64) as u8
}

/// Whether an integer is a valid register value (also used for MIDI keys).
pub fn is_register(value: i64) -> bool {
    (0..=MAX_REGISTER as i64).contains(&value)
}

/// Amplitude envelope of a note, in native register units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub attack: u8,
    pub decay: u8,
    pub sustain: u8,
    pub release: u8,
    /// 0 = hard left, 64 = center, 127 = hard right.
    pub pan: u8,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: MAX_REGISTER,
            decay: MAX_REGISTER,
            sustain: MAX_REGISTER,
            release: MAX_REGISTER,
            pan: PAN_CENTER,
        }
    }
}

impl Envelope {
    /// Build an envelope, clamping every field into register range.
    pub fn from_registers(attack: i64, decay: i64, sustain: i64, release: i64, pan: i64) -> Self {
        Self {
            attack: clamp_register(attack),
            decay: clamp_register(decay),
            sustain: clamp_register(sustain),
            release: clamp_register(release),
            pan: clamp_register(pan),
        }
    }

    /// Envelope used for unfilled keys of a range instrument.
    pub fn silent() -> Self {
        Self {
            sustain: 0,
            ..Self::default()
        }
    }

    pub fn attack_ms(&self) -> f64 {
        attack_ms(self.attack)
    }

    pub fn decay_time_ms(&self) -> f64 {
        decay_time_ms(self.decay, self.sustain)
    }

    pub fn release_time_ms(&self) -> f64 {
        release_time_ms(self.release, self.sustain)
    }

    pub fn sustain_fraction(&self) -> f64 {
        sustain_fraction(self.sustain)
    }
}

/// Time to reach full volume, in milliseconds, indexed by attack register.
pub static ATTACK_TIME_MS: [f64; 128] = [
    8606.1, 4758.6, 3342.5, 2598.0, 2134.6, 1811.8, 1577.5, 1405.7,
    1259.9, 1145.4, 1051.7, 968.4, 900.7, 843.4, 791.4, 749.7,
    708.1, 671.6, 635.2, 603.9, 583.1, 551.9, 531.0, 510.2,
    489.4, 473.8, 453.0, 442.5, 421.7, 411.3, 400.9, 390.5,
    374.9, 364.4, 354.0, 343.6, 333.2, 328.0, 317.6, 312.4,
    302.0, 296.8, 291.6, 281.1, 275.9, 270.7, 265.5, 260.3,
    255.1, 249.9, 244.7, 239.5, 234.3, 229.1, 223.9, 218.7,
    218.7, 213.5, 208.3, 208.3, 203.0, 203.0, 197.8, 197.8,
    187.4, 187.4, 182.2, 182.2, 177.0, 177.0, 171.8, 171.8,
    166.6, 166.6, 161.4, 161.4, 156.2, 156.2, 151.0, 151.0,
    151.0, 151.0, 145.8, 145.8, 145.8, 135.4, 135.4, 135.4,
    130.2, 130.2, 130.2, 130.2, 125.0, 125.0, 125.0, 119.7,
    119.7, 119.7, 119.7, 114.5, 114.5, 114.5, 114.5, 114.5,
    109.3, 109.3, 109.3, 109.3, 104.1, 98.9, 93.7, 88.5,
    83.3, 78.1, 72.9, 67.7, 62.5, 57.3, 52.1, 46.9,
    41.7, 36.4, 31.2, 26.0, 20.8, 15.6, 15.6, 0.0,
];

/// Time to fall from full volume to silence, in milliseconds, indexed by
/// decay/release register.
pub static MAX_DECAY_RELEASE_MS: [f64; 128] = [
    481816.6, 160605.5, 96364.4, 68833.2, 53536.9, 43806.2, 37064.0, 32123.2,
    28343.4, 25360.1, 22944.4, 20950.4, 19273.9, 17847.4, 16618.7, 15546.2,
    14603.8, 13770.8, 13026.3, 12354.7, 11755.9, 11209.3, 10709.5, 10256.5,
    9834.8, 9449.5, 9095.5, 8762.3, 8455.1, 8168.8, 7903.2, 7648.1,
    7413.8, 7195.2, 6986.9, 6789.1, 6601.7, 6424.6, 6258.0, 6101.8,
    5950.9, 5805.1, 5669.7, 5539.6, 5414.6, 5294.9, 5185.5, 5076.2,
    4972.1, 4867.9, 4774.2, 4727.4, 4680.5, 4592.0, 4550.4, 4461.8,
    4425.4, 4342.1, 4305.7, 4227.6, 4154.7, 4087.0, 4019.3, 3982.9,
    3920.4, 3857.9, 3764.2, 3706.9, 3654.9, 3597.6, 3519.5, 3467.4,
    3394.5, 3347.7, 3280.0, 3212.3, 3149.8, 3092.6, 3014.5, 2957.2,
    2905.1, 2837.5, 2769.8, 2707.3, 2650.0, 2577.1, 2509.5, 2462.6,
    2389.7, 2332.4, 2264.8, 2202.3, 2145.0, 2077.3, 2009.7, 1952.4,
    1884.7, 1827.4, 1759.7, 1697.3, 1634.8, 1572.3, 1509.8, 1447.4,
    1384.9, 1322.4, 1254.7, 1197.5, 1135.0, 1072.5, 1004.8, 942.3,
    879.9, 817.4, 754.9, 692.4, 630.0, 567.5, 505.0, 442.5,
    380.1, 317.6, 255.1, 192.6, 130.2, 67.7, 36.4, 0.0,
];

/// Sustain register as a linear volume fraction: `(v / 127)^2`.
pub fn sustain_fraction(sustain: u8) -> f64 {
    let v = sustain.min(MAX_REGISTER) as f64 / MAX_REGISTER as f64;
    v * v
}

/// Attack time in milliseconds.
pub fn attack_ms(attack: u8) -> f64 {
    if attack >= MAX_REGISTER {
        return 0.0;
    }
    ATTACK_TIME_MS[attack as usize]
}

/// Time to decay from full volume down to the sustain level.
pub fn decay_time_ms(decay: u8, sustain: u8) -> f64 {
    if decay >= MAX_REGISTER {
        return 0.0;
    }
    MAX_DECAY_RELEASE_MS[decay as usize] * (1.0 - sustain_fraction(sustain))
}

/// Time to release from the sustain level down to silence.
///
/// Decay and release share one max-time curve and split it by the sustain
/// fraction, so `decay_time_ms(v, s) + release_time_ms(v, s)` is the table
/// entry for `v`.
pub fn release_time_ms(release: u8, sustain: u8) -> f64 {
    if release >= MAX_REGISTER {
        return 0.0;
    }
    MAX_DECAY_RELEASE_MS[release as usize] * sustain_fraction(sustain)
}
