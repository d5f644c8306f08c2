//! # Filters
//!
//! Two kinds of recursive filter live here:
//!
//! - **`Biquad`** — a second-order IIR section using the RBJ "Audio EQ
//!   Cookbook" coefficient formulas, configurable as low-pass or
//!   high-pass. Two of them in series form the [`ToneFilter`] that shapes
//!   the feedback path: a high-pass strips rumble that would otherwise
//!   accumulate with every repeat, and a low-pass darkens the repeats the
//!   way tape and bucket-brigade delays do.
//!
//! - **`OnePoleSmoother`** — the simplest possible IIR low-pass, used not
//!   on audio but on *control* values. Feeding a changing delay time
//!   straight into the delay line makes the read head jump, which sounds
//!   like clicks or sudden pitch bends. Smoothing the delay time through
//!   a 10 Hz one-pole turns jumps into short glides.
//!
//! ## The Cookbook Coefficients
//!
//! For cutoff `f` at sample rate `sr` with quality factor `Q`:
//!
//! ```text
//! ω = 2π·f/sr,   α = sin(ω) / (2Q)
//!
//! low-pass:  b0 = b2 = (1 − cos ω)/2,  b1 = 1 − cos ω
//! high-pass: b0 = b2 = (1 + cos ω)/2,  b1 = −(1 + cos ω)
//! both:      a0 = 1 + α,  a1 = −2 cos ω,  a2 = 1 − α
//! ```
//!
//! All coefficients are normalized by `a0`. Q = 0.707 (Butterworth) gives
//! the flattest possible passband with no resonant bump.

use std::f32::consts::TAU;

/// A direct-form-I biquad: remembers its last two inputs and last two
/// outputs.
///
/// Coefficients are recomputed whenever the cutoff changes; the state
/// carries across coefficient updates so a slow cutoff sweep stays
/// click-free. No coefficient interpolation is applied — blocks are short
/// and the controls are swept by hand, so the residual transient is below
/// audibility.
#[derive(Clone, Copy, Default)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Configure as a low-pass at `freq` Hz.
    pub fn set_lowpass(&mut self, sample_rate: f32, freq: f32, q: f32) {
        let freq = freq.clamp(20.0, sample_rate * 0.49);
        let omega = TAU * freq / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let alpha = sin_w / (2.0 * q);

        let a0 = 1.0 + alpha;
        self.b0 = ((1.0 - cos_w) / 2.0) / a0;
        self.b1 = (1.0 - cos_w) / a0;
        self.b2 = self.b0;
        self.a1 = (-2.0 * cos_w) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Configure as a high-pass at `freq` Hz.
    pub fn set_highpass(&mut self, sample_rate: f32, freq: f32, q: f32) {
        let freq = freq.clamp(20.0, sample_rate * 0.49);
        let omega = TAU * freq / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let alpha = sin_w / (2.0 * q);

        let a0 = 1.0 + alpha;
        self.b0 = ((1.0 + cos_w) / 2.0) / a0;
        self.b1 = (-(1.0 + cos_w)) / a0;
        self.b2 = self.b0;
        self.a1 = (-2.0 * cos_w) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Run one sample through the difference equation:
    /// `y = b0·x + b1·x1 + b2·x2 − a1·y1 − a2·y2`.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Zero the filter memory.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// The feedback-path tone shaper: high-pass, then low-pass, both
/// Butterworth (Q = 0.707).
///
/// Every trip around the feedback loop passes through this chain again,
/// so the repeats get progressively thinner at the bottom and darker at
/// the top — the familiar decay of an analog echo.
#[derive(Clone, Copy, Default)]
pub struct ToneFilter {
    highpass: Biquad,
    lowpass: Biquad,
}

impl ToneFilter {
    const BUTTERWORTH_Q: f32 = 0.707;

    /// Recompute both coefficient sets. Called once per block; the filter
    /// state persists across updates.
    pub fn update(&mut self, sample_rate: f32, lowpass_hz: f32, highpass_hz: f32) {
        self.lowpass
            .set_lowpass(sample_rate, lowpass_hz, Self::BUTTERWORTH_Q);
        self.highpass
            .set_highpass(sample_rate, highpass_hz, Self::BUTTERWORTH_Q);
    }

    /// High-pass first (remove rumble), then low-pass (darken).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.lowpass.process(self.highpass.process(input))
    }

    pub fn reset(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
    }
}

/// Exponential one-pole low-pass for control signals.
///
/// ```text
/// state += coeff * (target - state),   coeff = 1 − e^(−2π·fc/sr)
/// ```
///
/// Unlike a fixed-step ramp, the response is sample-rate independent: a
/// 10 Hz smoother glides at the same speed at 44.1kHz and 192kHz.
#[derive(Clone, Copy, Default)]
pub struct OnePoleSmoother {
    coeff: f32,
    state: f32,
}

impl OnePoleSmoother {
    /// Set the smoothing cutoff. Lower = slower, smoother glides.
    pub fn set_cutoff(&mut self, sample_rate: f32, cutoff_hz: f32) {
        let omega = TAU * cutoff_hz / sample_rate;
        self.coeff = 1.0 - (-omega).exp();
    }

    /// Move one step toward `target` and return the smoothed value.
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.state += self.coeff * (target - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A low-pass must pass DC at unity: feeding a constant converges to
    /// that constant.
    #[test]
    fn lowpass_passes_dc() {
        let mut f = Biquad::default();
        f.set_lowpass(48000.0, 1000.0, 0.707);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = f.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "DC gain should be 1, got {out}");
    }

    /// A high-pass must block DC entirely.
    #[test]
    fn highpass_blocks_dc() {
        let mut f = Biquad::default();
        f.set_highpass(48000.0, 100.0, 0.707);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = f.process(1.0);
        }
        assert!(out.abs() < 1e-3, "DC should be rejected, got {out}");
    }

    /// A low-pass well below Nyquist must crush an alternating ±1 signal
    /// (the highest representable frequency).
    #[test]
    fn lowpass_attenuates_nyquist() {
        let mut f = Biquad::default();
        f.set_lowpass(44100.0, 200.0, 0.707);
        let mut peak = 0.0_f32;
        for i in 0..2000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            peak = peak.max(f.process(x).abs());
        }
        assert!(peak < 0.05, "expected heavy attenuation, got {peak}");
    }

    /// With the chain wide open (high-pass at 20 Hz, low-pass at 20 kHz)
    /// a 1 kHz tone should pass at very close to unity — the Butterworth
    /// response is maximally flat in the passband.
    #[test]
    fn tone_filter_wide_open_is_near_transparent_at_1k() {
        let mut tf = ToneFilter::default();
        tf.update(48000.0, 20000.0, 20.0);

        let mut peak = 0.0_f32;
        for n in 0..4800 {
            let x = (TAU * 1000.0 * n as f32 / 48000.0).sin();
            let y = tf.process(x);
            // Measure after the transient has settled.
            if n > 4300 {
                peak = peak.max(y.abs());
            }
        }
        assert!(
            (peak - 1.0).abs() < 0.05,
            "1 kHz gain should be near unity, got {peak}"
        );
    }

    /// Coefficient updates must preserve state without exploding: a long
    /// cutoff sweep over a sine stays bounded.
    #[test]
    fn tone_filter_survives_cutoff_sweeps() {
        let mut tf = ToneFilter::default();
        for n in 0..20000 {
            let lp = 2000.0 + (n as f32 / 20000.0) * 15000.0;
            let hp = 20.0 + (n as f32 / 20000.0) * 500.0;
            tf.update(48000.0, lp, hp);
            let x = (TAU * 440.0 * n as f32 / 48000.0).sin();
            let y = tf.process(x);
            assert!(y.is_finite() && y.abs() < 4.0, "unstable at n={n}: {y}");
        }
    }

    /// The smoother must converge monotonically to its target with no
    /// overshoot — overshoot on a delay-time control would momentarily
    /// read past the intended position.
    #[test]
    fn smoother_converges_without_overshoot() {
        let mut s = OnePoleSmoother::default();
        s.set_cutoff(48000.0, 10.0);

        let mut prev = 0.0;
        for _ in 0..48000 {
            let v = s.process(24000.0);
            assert!(v >= prev, "smoother must rise monotonically");
            assert!(v <= 24000.0, "smoother must not overshoot, got {v}");
            prev = v;
        }
        assert!(
            (prev - 24000.0).abs() < 1.0,
            "smoother should have converged after 1s, got {prev}"
        );
    }

    /// A 10 Hz smoother takes on the order of tens of milliseconds to
    /// close most of the distance — fast enough to track a knob, slow
    /// enough to avoid zipper noise.
    #[test]
    fn smoother_time_constant_is_in_the_right_ballpark() {
        let mut s = OnePoleSmoother::default();
        s.set_cutoff(48000.0, 10.0);

        // One time constant of a 10 Hz one-pole is 1/(2π·10) ≈ 15.9ms.
        let samples_per_tau = (48000.0 / (TAU * 10.0)) as usize;
        let mut v = 0.0;
        for _ in 0..samples_per_tau {
            v = s.process(1.0);
        }
        assert!(
            (v - 0.632).abs() < 0.02,
            "after one time constant the smoother should be ~63% of the way, got {v}"
        );
    }
}
