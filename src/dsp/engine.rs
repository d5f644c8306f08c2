//! # Delay Engine
//!
//! The orchestrator that composes every DSP primitive into one stereo
//! feedback loop, once per sample:
//!
//! ```text
//! dry ──┬────────────────────────────────── × (1-mix) ──────┐
//!       │                                                   │
//!       ├─► [Ducker] (envelope from dry)                    │
//!       │                                                   ▼
//!       └─►(+)─► [Delay / Reverse Line] ─► [Tone] ─► [Sat] ─┬─ × duck × mix ─►(+)─► × trim ─► [Limiter] ─► out
//!           ▲                                               │
//!           └────────────── × feedback ◄────────────────────┘
//! ```
//!
//! The engine knows nothing about the host: it consumes a plain
//! [`EngineParams`] snapshot once per block and a pair of channel slices,
//! which keeps the whole signal path testable without a plugin framework
//! in sight. Parameter values are clamped here, at the point of use —
//! a hostile snapshot degrades gracefully instead of failing.
//!
//! Only one piece of state is sample-accurate across block boundaries:
//! the 10 Hz one-pole smoothers on the per-channel delay times (plus the
//! grain state inside the reverse lines). Everything else is read once
//! per block.

use crate::dsp::delay_line::DelayLine;
use crate::dsp::ducker::Ducker;
use crate::dsp::filter::{OnePoleSmoother, ToneFilter};
use crate::dsp::limiter::SafetyLimiter;
use crate::dsp::modulator::StereoModulator;
use crate::dsp::reverse_delay::ReverseDelayLine;
use crate::dsp::saturator::Saturator;
use crate::params::{DelayMode, NoteDivision};

/// Longest supported delay. Also bounds the circular buffer allocation
/// made in [`DelayEngine::prepare`].
pub const MAX_DELAY_SECONDS: f32 = 2.5;

/// Delay times glide through a one-pole at this cutoff; 10 Hz turns
/// parameter jumps into ~50ms tape-speed glides instead of clicks.
const DELAY_SMOOTHING_HZ: f32 = 10.0;

/// Modulation depth 1.0 swings the delay time by this many samples.
const MAX_MOD_SWING_SAMPLES: f32 = 20.0;

/// Headroom clamp applied to delay-line input. Allows controlled
/// overshoot past full scale (saturation character feeds on it) while
/// structurally bounding the feedback loop.
const FEEDBACK_CLAMP: f32 = 1.25;

/// One block's worth of control values, snapshotted by the caller.
///
/// The engine reads this exactly once per [`DelayEngine::process_block`]
/// call; it holds no reference back to any parameter store, so tests can
/// build snapshots by hand.
#[derive(Clone, Copy, Debug)]
pub struct EngineParams {
    /// Manual delay time in milliseconds. Ignored when `tempo_sync` is
    /// on and the host reports a tempo.
    pub delay_time_ms: f32,
    pub tempo_sync: bool,
    pub note_division: NoteDivision,
    /// Host tempo in BPM, if the transport reports one.
    pub tempo_bpm: Option<f32>,
    /// Play the delay buffer backwards through windowed grains.
    pub reverse: bool,
    /// Feedback amount, clamped to [0, 0.95] at the point of use.
    pub feedback: f32,
    /// Dry/wet balance in [0, 1].
    pub mix: f32,
    /// Output trim in decibels.
    pub trim_db: f32,
    pub mode: DelayMode,
    /// Cross-feed the channels so echoes bounce left-right.
    pub ping_pong: bool,
    /// Extra delay on the right channel for stereo width, in ms.
    pub stereo_offset_ms: f32,
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
    pub mod_rate_hz: f32,
    pub mod_depth: f32,
    /// Saturation drive in [0, 1]; only effective in Analog mode.
    pub drive: f32,
    pub duck_amount: f32,
    pub duck_threshold: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            delay_time_ms: 300.0,
            tempo_sync: false,
            note_division: NoteDivision::Quarter,
            tempo_bpm: None,
            reverse: false,
            feedback: 0.4,
            mix: 0.3,
            trim_db: 0.0,
            mode: DelayMode::Digital,
            ping_pong: false,
            stereo_offset_ms: 0.0,
            highpass_hz: 80.0,
            lowpass_hz: 8000.0,
            mod_rate_hz: 0.8,
            mod_depth: 0.0,
            drive: 0.0,
            duck_amount: 0.0,
            duck_threshold: 0.3,
        }
    }
}

impl EngineParams {
    /// The delay time that actually drives the lines this block.
    ///
    /// With tempo sync on and a tempo available, one beat is
    /// `60000 / bpm` ms and the note division scales it (whole note = 4
    /// beats down to sixteenth triplet = 1/6). Without a usable tempo we
    /// fall back to the manual delay-time knob. The result is bounded to
    /// the buffer the engine actually allocated.
    pub fn effective_delay_ms(&self) -> f32 {
        let ms = match (self.tempo_sync, self.tempo_bpm) {
            (true, Some(bpm)) if bpm > 0.0 => {
                let ms_per_beat = 60_000.0 / bpm;
                ms_per_beat * self.note_division.beat_multiplier()
            }
            _ => self.delay_time_ms,
        };
        ms.clamp(0.0, MAX_DELAY_SECONDS * 1000.0)
    }
}

/// All per-voice DSP state for one stereo delay instance.
///
/// Left/right components are independent owned instances — no sharing,
/// no aliasing. Everything is allocated in [`prepare`](Self::prepare) and
/// only mutated (never resized) during [`process_block`](Self::process_block).
pub struct DelayEngine {
    sample_rate: f32,

    delay_left: DelayLine,
    delay_right: DelayLine,
    reverse_left: ReverseDelayLine,
    reverse_right: ReverseDelayLine,

    tone_left: ToneFilter,
    tone_right: ToneFilter,
    saturator_left: Saturator,
    saturator_right: Saturator,

    modulator: StereoModulator,
    ducker: Ducker,
    limiter: SafetyLimiter,

    delay_smoother_left: OnePoleSmoother,
    delay_smoother_right: OnePoleSmoother,

    // Post-limiter block peaks, exposed for metering.
    peak_left: f32,
    peak_right: f32,
}

impl Default for DelayEngine {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            delay_left: DelayLine::default(),
            delay_right: DelayLine::default(),
            reverse_left: ReverseDelayLine::default(),
            reverse_right: ReverseDelayLine::default(),
            tone_left: ToneFilter::default(),
            tone_right: ToneFilter::default(),
            saturator_left: Saturator::default(),
            saturator_right: Saturator::default(),
            modulator: StereoModulator::default(),
            ducker: Ducker::default(),
            limiter: SafetyLimiter::default(),
            delay_smoother_left: OnePoleSmoother::default(),
            delay_smoother_right: OnePoleSmoother::default(),
            peak_left: 0.0,
            peak_right: 0.0,
        }
    }
}

impl DelayEngine {
    /// Size every buffer and coefficient for `sample_rate`. The only
    /// allocations the engine ever makes happen here.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;

        self.delay_left.initialize(sample_rate, MAX_DELAY_SECONDS);
        self.delay_right.initialize(sample_rate, MAX_DELAY_SECONDS);
        self.reverse_left.initialize(sample_rate, MAX_DELAY_SECONDS);
        self.reverse_right.initialize(sample_rate, MAX_DELAY_SECONDS);

        self.modulator.initialize(sample_rate);
        self.ducker.initialize(sample_rate);
        self.limiter.initialize(sample_rate);

        self.delay_smoother_left
            .set_cutoff(sample_rate, DELAY_SMOOTHING_HZ);
        self.delay_smoother_right
            .set_cutoff(sample_rate, DELAY_SMOOTHING_HZ);

        self.reset();
    }

    /// Zero all state without touching any allocation. Safe to call
    /// repeatedly; called on transport stop.
    pub fn reset(&mut self) {
        self.delay_left.reset();
        self.delay_right.reset();
        self.reverse_left.reset();
        self.reverse_right.reset();
        self.tone_left.reset();
        self.tone_right.reset();
        self.modulator.reset();
        self.ducker.reset();
        self.limiter.reset();
        self.delay_smoother_left.reset();
        self.delay_smoother_right.reset();
        self.peak_left = 0.0;
        self.peak_right = 0.0;
    }

    /// Post-limiter peak magnitudes of the last processed block, for a
    /// level meter. Not part of the audio contract.
    pub fn block_peaks(&self) -> (f32, f32) {
        (self.peak_left, self.peak_right)
    }

    /// Process one stereo block in place.
    ///
    /// The two slices must be the same length; the shorter one bounds
    /// processing. Never allocates, never blocks, always runs to
    /// completion, and always leaves finite samples in [-1, 1].
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], params: &EngineParams) {
        // Clamp once up front; the snapshot may carry anything.
        let feedback = params.feedback.clamp(0.0, 0.95);
        let mix = params.mix.clamp(0.0, 1.0);
        let mod_depth = params.mod_depth.clamp(0.0, 1.0);
        let duck_amount = params.duck_amount.clamp(0.0, 1.0);
        let duck_threshold = params.duck_threshold.clamp(0.0, 1.0);
        let trim_gain = nih_plug::util::db_to_gain(params.trim_db);
        let analog = params.mode == DelayMode::Analog;

        let delay_ms = params.effective_delay_ms();
        let base_delay_samples = delay_ms * self.sample_rate / 1000.0;
        let offset_samples = params.stereo_offset_ms.max(0.0) * self.sample_rate / 1000.0;
        // Offset and modulation must never push a read past the buffer.
        let max_delay_samples = MAX_DELAY_SECONDS * self.sample_rate;

        // Coefficients change at most once per block.
        self.tone_left
            .update(self.sample_rate, params.lowpass_hz, params.highpass_hz);
        self.tone_right
            .update(self.sample_rate, params.lowpass_hz, params.highpass_hz);

        let effective_drive = if analog { params.drive } else { 0.0 };
        self.saturator_left.set_drive(effective_drive);
        self.saturator_right.set_drive(effective_drive);

        let modulating = analog && mod_depth > 0.001;
        let ducking = duck_amount > 0.001;

        let mut peak_left = 0.0_f32;
        let mut peak_right = 0.0_f32;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let input_left = *l;
            let input_right = *r;

            // Per-channel target delays. Ping-pong wants both taps at the
            // same time so the bounce stays on the grid; independent
            // stereo offsets the right tap for width.
            let target_left = base_delay_samples;
            let target_right = if params.ping_pong {
                base_delay_samples
            } else {
                base_delay_samples + offset_samples
            };

            let (target_left, target_right) = if modulating {
                self.modulator.modulated_delays(
                    target_left,
                    target_right,
                    mod_depth * MAX_MOD_SWING_SAMPLES,
                    params.mod_rate_hz,
                )
            } else {
                (target_left, target_right)
            };

            // Modulation could push a very short delay below zero, and
            // offset could push a very long one past the buffer.
            let smooth_left = self
                .delay_smoother_left
                .process(target_left.clamp(0.0, max_delay_samples));
            let smooth_right = self
                .delay_smoother_right
                .process(target_right.clamp(0.0, max_delay_samples));

            // Duck from the dry input, before any processing touches it.
            let duck_gain = if ducking {
                self.ducker
                    .process_stereo(input_left, input_right, duck_threshold, duck_amount)
            } else {
                1.0
            };

            let (delayed_left, delayed_right) = if params.reverse {
                (
                    self.reverse_left.read(smooth_left),
                    self.reverse_right.read(smooth_right),
                )
            } else {
                (
                    self.delay_left.read(smooth_left),
                    self.delay_right.read(smooth_right),
                )
            };

            let processed_left = self
                .saturator_left
                .process(self.tone_left.process(delayed_left));
            let processed_right = self
                .saturator_right
                .process(self.tone_right.process(delayed_right));

            // What goes back into the lines. Ping-pong sums the dry input
            // to mono into the left line and cross-feeds each side's
            // repeats into the other, producing the alternating bounce.
            let (line_in_left, line_in_right) = if params.ping_pong {
                let mono_in = 0.5 * (input_left + input_right);
                (
                    mono_in + processed_right * feedback,
                    processed_left * feedback,
                )
            } else {
                (
                    input_left + processed_left * feedback,
                    input_right + processed_right * feedback,
                )
            };

            let line_in_left = line_in_left.clamp(-FEEDBACK_CLAMP, FEEDBACK_CLAMP);
            let line_in_right = line_in_right.clamp(-FEEDBACK_CLAMP, FEEDBACK_CLAMP);

            if params.reverse {
                self.reverse_left.write(line_in_left);
                self.reverse_right.write(line_in_right);
            } else {
                self.delay_left.write(line_in_left);
                self.delay_right.write(line_in_right);
            }

            // Ducking shapes only the wet signal; the dry path stays put.
            let wet_left = processed_left * duck_gain;
            let wet_right = processed_right * duck_gain;

            let mut out_left = (input_left * (1.0 - mix) + wet_left * mix) * trim_gain;
            let mut out_right = (input_right * (1.0 - mix) + wet_right * mix) * trim_gain;

            let stereo_peak = out_left.abs().max(out_right.abs());
            let limiter_gain = self.limiter.process(stereo_peak);
            out_left = (out_left * limiter_gain).clamp(-1.0, 1.0);
            out_right = (out_right * limiter_gain).clamp(-1.0, 1.0);

            peak_left = peak_left.max(out_left.abs());
            peak_right = peak_right.max(out_right.abs());

            *l = out_left;
            *r = out_right;
        }

        self.peak_left = peak_left;
        self.peak_right = peak_right;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn prepared_engine() -> DelayEngine {
        let mut engine = DelayEngine::default();
        engine.prepare(SR);
        engine
    }

    /// A wide-open snapshot: no feedback, fully wet, filters out of the
    /// way, everything optional off.
    fn pure_delay_params(delay_ms: f32) -> EngineParams {
        EngineParams {
            delay_time_ms: delay_ms,
            feedback: 0.0,
            mix: 1.0,
            trim_db: 0.0,
            stereo_offset_ms: 0.0,
            highpass_hz: 20.0,
            lowpass_hz: 20000.0,
            duck_amount: 0.0,
            ..EngineParams::default()
        }
    }

    /// Run the engine over silence until the delay-time smoothers have
    /// fully converged, so tests measure steady-state behavior.
    fn settle(engine: &mut DelayEngine, params: &EngineParams) {
        let mut l = vec![0.0; SR as usize];
        let mut r = vec![0.0; SR as usize];
        engine.process_block(&mut l, &mut r, params);
    }

    /// Pure delay: an impulse comes back exactly one delay later. At
    /// 500ms and 48kHz that is 24000 samples (+1 for the read-then-write
    /// ordering within a sample).
    #[test]
    fn impulse_returns_after_the_delay_time() {
        let mut engine = prepared_engine();
        let params = pure_delay_params(500.0);
        settle(&mut engine, &params);

        let n = 26000;
        let mut l = vec![0.0; n];
        let mut r = vec![0.0; n];
        l[0] = 0.5;
        r[0] = 0.5;
        engine.process_block(&mut l, &mut r, &params);

        let (argmax, peak) = l
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.abs()))
            .fold((0, 0.0_f32), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

        assert!(
            (24000..=24002).contains(&argmax),
            "echo should land at ~24001 samples, got {argmax}"
        );
        assert!(peak > 0.25, "echo should retain most of its level, got {peak}");

        // Nothing leaks out before the delay time.
        let early_peak = l[..23900].iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(early_peak < 0.01, "no signal before the echo, got {early_peak}");
    }

    /// The safety-limiter invariant: with feedback near the maximum and a
    /// sustained full-scale input, no output sample may ever exceed 1.0.
    #[test]
    fn output_never_exceeds_full_scale_under_heavy_feedback() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            delay_time_ms: 50.0,
            feedback: 0.9,
            mix: 1.0,
            duck_amount: 0.0,
            highpass_hz: 20.0,
            lowpass_hz: 20000.0,
            ..EngineParams::default()
        };

        // Three seconds of sustained full-scale input.
        for _ in 0..30 {
            let mut l = vec![1.0; 4800];
            let mut r = vec![1.0; 4800];
            engine.process_block(&mut l, &mut r, &params);
            for (i, s) in l.iter().chain(r.iter()).enumerate() {
                assert!(s.is_finite(), "non-finite sample at {i}");
                assert!(s.abs() <= 1.0, "sample {i} exceeded full scale: {s}");
            }
        }
    }

    /// Ping-pong: a mono impulse on the left alternates right ← → left
    /// on successive echoes, each quieter than the last.
    #[test]
    fn ping_pong_echoes_alternate_and_decay() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            delay_time_ms: 100.0,
            feedback: 0.5,
            mix: 1.0,
            ping_pong: true,
            highpass_hz: 20.0,
            lowpass_hz: 20000.0,
            duck_amount: 0.0,
            ..EngineParams::default()
        };
        settle(&mut engine, &params);

        let hop = 4801; // 100ms at 48kHz plus the per-loop sample.
        let n = hop * 4 + 800;
        let mut l = vec![0.0; n];
        let mut r = vec![0.0; n];
        l[0] = 1.0; // left channel only
        engine.process_block(&mut l, &mut r, &params);

        let window_peak = |buf: &[f32], center: usize| {
            buf[center.saturating_sub(60)..center + 60]
                .iter()
                .fold(0.0_f32, |m, s| m.max(s.abs()))
        };

        let mut echo_peaks = Vec::new();
        for k in 1..=3 {
            let center = k * hop;
            let peak_l = window_peak(&l, center);
            let peak_r = window_peak(&r, center);
            if k % 2 == 1 {
                assert!(
                    peak_l > 4.0 * peak_r,
                    "echo {k} should be on the left: L={peak_l} R={peak_r}"
                );
                echo_peaks.push(peak_l);
            } else {
                assert!(
                    peak_r > 4.0 * peak_l,
                    "echo {k} should be on the right: L={peak_l} R={peak_r}"
                );
                echo_peaks.push(peak_r);
            }
        }
        assert!(
            echo_peaks[0] > echo_peaks[1] && echo_peaks[1] > echo_peaks[2],
            "echoes must decay: {echo_peaks:?}"
        );
    }

    /// The ping-pong mono sum `0.5 * (L + R)` only carries the full
    /// signal when both channels do: a dual-mono input produces echoes
    /// at exactly twice the level of a left-only input. A mono source
    /// must therefore be copied into both channels before processing or
    /// its echoes land 6 dB low.
    #[test]
    fn ping_pong_dual_mono_input_keeps_full_echo_level() {
        let run = |dual_mono: bool| {
            let mut engine = prepared_engine();
            let params = EngineParams {
                delay_time_ms: 100.0,
                feedback: 0.5,
                mix: 1.0,
                ping_pong: true,
                highpass_hz: 20.0,
                lowpass_hz: 20000.0,
                duck_amount: 0.0,
                ..EngineParams::default()
            };
            settle(&mut engine, &params);

            let hop = 4801;
            let mut l = vec![0.0; hop + 400];
            let mut r = vec![0.0; hop + 400];
            l[0] = 0.8;
            if dual_mono {
                r[0] = 0.8;
            }
            engine.process_block(&mut l, &mut r, &params);
            // Peak of the first echo, which lands on the left.
            l[hop - 60..hop + 60].iter().fold(0.0_f32, |m, s| m.max(s.abs()))
        };

        let left_only = run(false);
        let dual_mono = run(true);
        assert!(left_only > 0.05, "first echo missing: {left_only}");
        assert!(
            (dual_mono - 2.0 * left_only).abs() < 1e-3,
            "dual-mono echo should be exactly twice the left-only echo: {dual_mono} vs {left_only}"
        );
    }

    /// Tempo sync: 120 BPM quarter notes are 500ms.
    #[test]
    fn tempo_sync_quarter_at_120_bpm_is_500ms() {
        let params = EngineParams {
            tempo_sync: true,
            tempo_bpm: Some(120.0),
            note_division: NoteDivision::Quarter,
            delay_time_ms: 123.0,
            ..EngineParams::default()
        };
        assert!((params.effective_delay_ms() - 500.0).abs() < 1e-3);
    }

    /// Without a host tempo, sync falls back to the manual knob.
    #[test]
    fn tempo_sync_without_tempo_falls_back_to_manual_time() {
        let params = EngineParams {
            tempo_sync: true,
            tempo_bpm: None,
            delay_time_ms: 123.0,
            ..EngineParams::default()
        };
        assert!((params.effective_delay_ms() - 123.0).abs() < 1e-6);
    }

    /// Dotted and triplet divisions scale a 120 BPM beat correctly.
    #[test]
    fn tempo_sync_handles_dotted_and_triplet_divisions() {
        let base = EngineParams {
            tempo_sync: true,
            tempo_bpm: Some(120.0),
            ..EngineParams::default()
        };
        let cases = [
            (NoteDivision::Whole, 2000.0),
            (NoteDivision::EighthDotted, 375.0),
            (NoteDivision::QuarterTriplet, 500.0 * 2.0 / 3.0),
            (NoteDivision::SixteenthTriplet, 500.0 / 6.0),
        ];
        for (division, expected) in cases {
            let params = EngineParams {
                note_division: division,
                ..base
            };
            let got = params.effective_delay_ms();
            assert!(
                (got - expected).abs() < 1e-2,
                "{division:?}: expected {expected}ms, got {got}"
            );
        }
    }

    /// Trim scales the output: -6dB on a dry-only signal halves it.
    #[test]
    fn trim_scales_the_output() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            mix: 0.0,
            trim_db: -6.0206,
            duck_amount: 0.0,
            ..EngineParams::default()
        };
        let mut l = vec![0.25; 512];
        let mut r = vec![0.25; 512];
        engine.process_block(&mut l, &mut r, &params);
        for s in &l {
            assert!((s - 0.125).abs() < 1e-3, "expected 0.125, got {s}");
        }
    }

    /// A hostile snapshot (values far out of range) must degrade to
    /// clamped behavior, not blow up.
    #[test]
    fn out_of_range_snapshot_is_clamped_not_fatal() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            delay_time_ms: 1e9,
            feedback: 42.0,
            mix: -3.0,
            mod_depth: 99.0,
            duck_amount: -1.0,
            stereo_offset_ms: -500.0,
            highpass_hz: -20.0,
            lowpass_hz: 1e9,
            ..EngineParams::default()
        };
        for _ in 0..20 {
            let mut l = vec![1.0; 1024];
            let mut r = vec![-1.0; 1024];
            engine.process_block(&mut l, &mut r, &params);
            for s in l.iter().chain(r.iter()) {
                assert!(s.is_finite() && s.abs() <= 1.0, "unbounded sample: {s}");
            }
        }
    }

    /// Block peaks report the post-limiter output level for metering.
    #[test]
    fn block_peaks_track_the_output() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            mix: 0.0,
            duck_amount: 0.0,
            ..EngineParams::default()
        };
        let mut l = vec![0.0; 256];
        let mut r = vec![0.0; 256];
        l[100] = 0.6;
        r[100] = -0.3;
        engine.process_block(&mut l, &mut r, &params);
        let (pl, pr) = engine.block_peaks();
        assert!((pl - 0.6).abs() < 1e-3, "left peak: {pl}");
        assert!((pr - 0.3).abs() < 1e-3, "right peak: {pr}");
    }

    /// Reverse mode produces output without violating the output bound.
    #[test]
    fn reverse_mode_is_stable_and_audible() {
        let mut engine = prepared_engine();
        let params = EngineParams {
            delay_time_ms: 200.0,
            reverse: true,
            feedback: 0.4,
            mix: 1.0,
            highpass_hz: 20.0,
            lowpass_hz: 20000.0,
            duck_amount: 0.0,
            ..EngineParams::default()
        };

        let mut peak = 0.0_f32;
        // Two seconds of a 220 Hz tone.
        for block in 0..20 {
            let mut l: Vec<f32> = (0..4800)
                .map(|i| {
                    let n = (block * 4800 + i) as f32;
                    0.5 * (std::f32::consts::TAU * 220.0 * n / SR).sin()
                })
                .collect();
            let mut r = l.clone();
            engine.process_block(&mut l, &mut r, &params);
            for s in l.iter().chain(r.iter()) {
                assert!(s.is_finite() && s.abs() <= 1.0);
                peak = peak.max(s.abs());
            }
        }
        assert!(peak > 0.05, "reverse mode should produce audible output");
    }

    /// Digital mode ignores drive entirely; Analog mode engages it. With
    /// identical hot input, the analog output spectrum is compressed, so
    /// its peak level differs from the digital one.
    #[test]
    fn drive_only_engages_in_analog_mode() {
        let run = |mode: DelayMode| {
            let mut engine = prepared_engine();
            let params = EngineParams {
                delay_time_ms: 20.0,
                feedback: 0.0,
                mix: 1.0,
                mode,
                drive: 1.0,
                mod_depth: 0.0,
                highpass_hz: 20.0,
                lowpass_hz: 20000.0,
                duck_amount: 0.0,
                ..EngineParams::default()
            };
            settle(&mut engine, &params);
            let mut l: Vec<f32> = (0..4800)
                .map(|i| 0.9 * (std::f32::consts::TAU * 1000.0 * i as f32 / SR).sin())
                .collect();
            let mut r = l.clone();
            engine.process_block(&mut l, &mut r, &params);
            // Steady-state region well past the 20ms delay.
            l[2000..4000].iter().fold(0.0_f32, |m, s| m.max(s.abs()))
        };

        let digital = run(DelayMode::Digital);
        let analog = run(DelayMode::Analog);
        assert!(
            (digital - analog).abs() > 0.01,
            "drive should change the analog output: digital={digital} analog={analog}"
        );
    }
}
