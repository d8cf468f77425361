//! Envelope conversion to SF2 generator units.
//!
//! Register values are first taken to the time/level domain by
//! [`bankforge_model::envelope`], then re-encoded here as timecents
//! (`1200 * log2(seconds)`) and centibels of attenuation.

use bankforge_model::envelope::{sustain_fraction, Envelope, MAX_REGISTER, PAN_CENTER};

/// Release stretch applied before the timecents conversion.
///
/// The source release is a linear ramp while the SF2 release is exponential,
/// which sounds shorter at the same nominal time. Decay is left unscaled to
/// keep transients intact.
pub const RELEASE_STRETCH: f64 = 1.8;

/// Lowest timecents value (about 1 ms).
pub const TIMECENTS_MIN: i16 = -12000;

/// Highest timecents value (about 101 s).
pub const TIMECENTS_MAX: i16 = 8000;

/// Attenuation treated as silence, in centibels.
pub const SUSTAIN_SILENCE_CB: i16 = 1440;

/// Pan extent in 0.1% units.
pub const PAN_EXTENT: i16 = 500;

/// Sustain register to SF2 sustain attenuation in centibels.
pub fn sustain_centibels(sustain: u8) -> i16 {
    if sustain >= MAX_REGISTER {
        return 0;
    }
    if sustain == 0 {
        return SUSTAIN_SILENCE_CB;
    }
    let cb = (-200.0 * sustain_fraction(sustain).log10()).round();
    cb.clamp(0.0, SUSTAIN_SILENCE_CB as f64) as i16
}

/// Milliseconds to timecents, clamped to the SF2 range.
pub fn ms_to_timecents(ms: f64) -> i16 {
    if ms.is_nan() || ms <= 0.0 {
        return TIMECENTS_MIN;
    }
    let tc = (1200.0 * (ms / 1000.0).log2()).round();
    tc.clamp(TIMECENTS_MIN as f64, TIMECENTS_MAX as f64) as i16
}

/// Pan register (64 = center) to SF2 pan in 0.1% units.
pub fn pan_to_sf2(pan: u8) -> i16 {
    let offset = pan.min(MAX_REGISTER) as i32 - PAN_CENTER as i32;
    let span = if offset < 0 {
        PAN_CENTER as i32
    } else {
        (MAX_REGISTER - PAN_CENTER) as i32
    };
    let value = (offset as f64 * PAN_EXTENT as f64 / span as f64).round() as i32;
    value.clamp(-(PAN_EXTENT as i32), PAN_EXTENT as i32) as i16
}

/// Volume envelope expressed as SF2 generator amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sf2Envelope {
    /// Pan, 0.1% units (-500..=500).
    pub pan: i16,
    /// Attack time, timecents.
    pub attack: i16,
    /// Decay time, timecents.
    pub decay: i16,
    /// Sustain attenuation, centibels.
    pub sustain: i16,
    /// Release time, timecents.
    pub release: i16,
}

impl Sf2Envelope {
    /// Convert a register envelope.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Self {
            pan: pan_to_sf2(envelope.pan),
            attack: ms_to_timecents(envelope.attack_ms()),
            decay: ms_to_timecents(envelope.decay_time_ms()),
            sustain: sustain_centibels(envelope.sustain),
            release: ms_to_timecents(envelope.release_time_ms() * RELEASE_STRETCH),
        }
    }
}
