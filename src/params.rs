//! # Plugin Parameters
//!
//! Parameters are the knobs and sliders the user sees in the DAW. Each
//! parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   save and recall presets. Once published, never change these IDs
//!   or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** (min, max, and optional skew).
//! - A **default value**.
//!
//! ## Why no framework smoothing?
//!
//! The engine snapshots every value once per block and does its own
//! smoothing where it matters: delay-time changes glide through a 10 Hz
//! one-pole inside the engine (a tape-style pitch swoop rather than a
//! click), and filter/saturation coefficients update at most once per
//! block, which is inaudible at typical block sizes. Stacking framework
//! smoothers on top of that would just smear the control flow twice.

use nih_plug::prelude::*;

/// Character of the wet path.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    /// Clean repeats: no saturation, no modulation.
    #[id = "digital"]
    #[name = "Digital"]
    Digital,

    /// Tape-flavored repeats: the drive and modulation controls come
    /// alive, adding harmonic warmth and a gentle pitch wobble.
    #[id = "analog"]
    #[name = "Analog"]
    Analog,
}

/// Musical note lengths for tempo-synced delay times.
///
/// Grouped by note value from whole down to sixteenth, each value in
/// plain, dotted, triplet order, so the host's enum UI reads like a
/// note value menu. Each variant maps to a number of beats via
/// [`beat_multiplier`](Self::beat_multiplier): a dotted note is 1.5x its
/// plain length, a triplet is 2/3 of it.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDivision {
    #[id = "whole"]
    #[name = "1/1"]
    Whole,
    #[id = "half"]
    #[name = "1/2"]
    Half,
    #[id = "half_dotted"]
    #[name = "1/2."]
    HalfDotted,
    #[id = "half_triplet"]
    #[name = "1/2T"]
    HalfTriplet,
    #[id = "quarter"]
    #[name = "1/4"]
    Quarter,
    #[id = "quarter_dotted"]
    #[name = "1/4."]
    QuarterDotted,
    #[id = "quarter_triplet"]
    #[name = "1/4T"]
    QuarterTriplet,
    #[id = "eighth"]
    #[name = "1/8"]
    Eighth,
    #[id = "eighth_dotted"]
    #[name = "1/8."]
    EighthDotted,
    #[id = "eighth_triplet"]
    #[name = "1/8T"]
    EighthTriplet,
    #[id = "sixteenth"]
    #[name = "1/16"]
    Sixteenth,
    #[id = "sixteenth_dotted"]
    #[name = "1/16."]
    SixteenthDotted,
    #[id = "sixteenth_triplet"]
    #[name = "1/16T"]
    SixteenthTriplet,
}

impl NoteDivision {
    /// How many beats (quarter notes) this division spans. Multiply by
    /// the length of one beat (`60000 / bpm` ms) to get the delay time.
    pub fn beat_multiplier(self) -> f32 {
        match self {
            Self::Whole => 4.0,
            Self::HalfDotted => 3.0,
            Self::Half => 2.0,
            Self::HalfTriplet => 4.0 / 3.0,
            Self::QuarterDotted => 1.5,
            Self::Quarter => 1.0,
            Self::QuarterTriplet => 2.0 / 3.0,
            Self::EighthDotted => 0.75,
            Self::Eighth => 0.5,
            Self::EighthTriplet => 1.0 / 3.0,
            Self::SixteenthDotted => 0.375,
            Self::Sixteenth => 0.25,
            Self::SixteenthTriplet => 1.0 / 6.0,
        }
    }
}

/// All user-facing parameters for the Driftline Delay plugin.
///
/// The `#[derive(Params)]` macro automatically generates the code that
/// registers these parameters with the host DAW and handles
/// serialization for presets.
#[derive(Params)]
pub struct DriftlineParams {
    /// **Delay Time** — how long before you hear the echo.
    ///
    /// Musically, short delays (under ~150ms) give slapback, medium ones
    /// (300-600ms) give distinct echoes, and the top of the range turns
    /// into a looper-ish wash. The skewed range puts roughly half the
    /// knob travel below 300ms, where small changes matter most.
    ///
    /// Ignored while **Tempo Sync** is on and the host reports a tempo.
    #[id = "delay"]
    pub delay_time: FloatParam,

    /// **Tempo Sync** — lock the delay time to the host tempo.
    ///
    /// When enabled, **Note Division** picks the delay time as a note
    /// length at the current BPM and the Delay Time knob is ignored. If
    /// the host doesn't report a tempo (some standalone hosts don't), we
    /// quietly fall back to the manual knob.
    #[id = "sync"]
    pub tempo_sync: BoolParam,

    /// **Note Division** — the note length used when tempo sync is on.
    #[id = "division"]
    pub note_division: EnumParam<NoteDivision>,

    /// **Reverse** — play the echoes backwards.
    ///
    /// Swaps the standard delay lines for granular reverse playback:
    /// overlapping windowed chunks of the buffer played back-to-front.
    /// Changing the delay time while reversed takes effect at the next
    /// chunk boundary, which is part of the charm.
    #[id = "rev"]
    pub reverse: BoolParam,

    /// **Feedback** — how many times the echo repeats.
    ///
    /// - 0% = one echo only
    /// - 40% = several echoes, fading naturally
    /// - 95% = very long, slowly decaying tails
    ///
    /// Capped at 95%: beyond that the loop would sustain or grow
    /// forever. Even at the cap the tone filters bleed energy out of
    /// each pass, so the tail always decays eventually.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Mix** — balance between dry and delayed signal.
    ///
    /// Set to 100% on a send/bus, 20-40% as an insert.
    #[id = "mix"]
    pub mix: FloatParam,

    /// **Mode** — Digital (clean) or Analog (saturated, modulated).
    #[id = "mode"]
    pub mode: EnumParam<DelayMode>,

    /// **Ping Pong** — bounce the echoes between left and right.
    ///
    /// The input is summed to mono and each repeat is cross-fed into the
    /// opposite channel, so echoes alternate sides. Stereo Offset has no
    /// effect in this mode; the bounce needs both taps on the same grid.
    #[id = "pong"]
    pub ping_pong: BoolParam,

    /// **Stereo Offset** — extra delay on the right channel, in ms.
    ///
    /// A few milliseconds of skew widens the image (Haas effect) without
    /// changing the perceived delay time.
    #[id = "width"]
    pub stereo_offset: FloatParam,

    /// **High Cut** — lowpass filter on the repeats.
    ///
    /// Lower values darken every pass through the feedback loop, the way
    /// tape echoes lose top end generation by generation.
    #[id = "lpf"]
    pub lowpass: FloatParam,

    /// **Low Cut** — highpass filter on the repeats.
    ///
    /// Thins mud out of the echo tail; 80-120 Hz keeps the low end of
    /// the dry signal from piling up in the repeats.
    #[id = "hpf"]
    pub highpass: FloatParam,

    /// **Mod Rate** — speed of the delay-time wobble (Analog mode only).
    #[id = "modrate"]
    pub mod_rate: FloatParam,

    /// **Mod Depth** — amount of delay-time wobble (Analog mode only).
    ///
    /// The two channels wobble in antiphase, so depth also widens the
    /// image. Full depth swings the delay by about 20 samples, enough
    /// for an obvious chorus without sounding broken.
    #[id = "moddepth"]
    pub mod_depth: FloatParam,

    /// **Drive** — saturation on the repeats (Analog mode only).
    ///
    /// Soft-clips each pass through the feedback loop, so later repeats
    /// get progressively more compressed and harmonically dense.
    #[id = "drive"]
    pub drive: FloatParam,

    /// **Ducking** — push the echoes down while the dry signal plays.
    ///
    /// At 0% the effect is off. Higher values duck the wet signal harder
    /// whenever the dry input is above the ducking threshold, then let
    /// the tail bloom back in the gaps.
    #[id = "duck"]
    pub duck_amount: FloatParam,

    /// **Duck Threshold** — dry level above which ducking engages.
    #[id = "duckthr"]
    pub duck_threshold: FloatParam,

    /// **Trim** — output level adjustment, applied to dry and wet alike.
    #[id = "trim"]
    pub trim: FloatParam,
}

impl Default for DriftlineParams {
    fn default() -> Self {
        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                300.0,
                FloatRange::Skewed {
                    min: 1.0,
                    max: 2500.0,
                    // Negative skew = more knob resolution at short times.
                    factor: FloatRange::skew_factor(-1.5),
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1),

            tempo_sync: BoolParam::new("Tempo Sync", false),

            note_division: EnumParam::new("Note Division", NoteDivision::Quarter),

            reverse: BoolParam::new("Reverse", false),

            feedback: FloatParam::new(
                "Feedback",
                0.40,
                FloatRange::Linear {
                    min: 0.0,
                    max: 0.95, // Capped below 1.0 for stability
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            mix: FloatParam::new("Mix", 0.30, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            mode: EnumParam::new("Mode", DelayMode::Digital),

            ping_pong: BoolParam::new("Ping Pong", false),

            stereo_offset: FloatParam::new(
                "Stereo Offset",
                10.0,
                FloatRange::Linear { min: 0.0, max: 50.0 },
            )
            .with_unit(" ms")
            .with_step_size(0.1),

            lowpass: FloatParam::new(
                "High Cut",
                8000.0,
                FloatRange::Skewed {
                    min: 500.0,
                    max: 20000.0,
                    // Frequency perception is roughly logarithmic, so
                    // give the low end most of the knob travel.
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(1.0),

            highpass: FloatParam::new(
                "Low Cut",
                80.0,
                FloatRange::Skewed {
                    min: 20.0,
                    max: 1000.0,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(1.0),

            mod_rate: FloatParam::new(
                "Mod Rate",
                0.8,
                FloatRange::Skewed {
                    min: 0.1,
                    max: 5.0,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(0.01),

            mod_depth: FloatParam::new(
                "Mod Depth",
                0.3,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            drive: FloatParam::new("Drive", 0.2, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            duck_amount: FloatParam::new(
                "Ducking",
                0.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            duck_threshold: FloatParam::new(
                "Duck Threshold",
                0.3,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            trim: FloatParam::new(
                "Trim",
                0.0,
                FloatRange::Linear {
                    min: -12.0,
                    max: 12.0,
                },
            )
            .with_unit(" dB")
            .with_step_size(0.1),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
