//! # Ducker
//!
//! Sidechain-style gain control for the wet signal: when the dry input is
//! loud, the echoes pull back and stay out of the way; in the gaps they
//! swell up to fill the space. Vocal delays live on this trick.
//!
//! A single peak-following envelope tracks the dry input with a fast
//! attack (duck quickly when a phrase starts) and a slow release (swell
//! back gently when it ends). The returned gain multiplies the wet
//! signal only; the dry path is never touched.

/// Peak-detecting envelope follower with asymmetric attack/release,
/// producing a wet-signal gain in [0, 1].
#[derive(Clone, Copy)]
pub struct Ducker {
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl Default for Ducker {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
        }
    }
}

impl Ducker {
    /// Prepare for a sample rate with the stock 5ms attack / 200ms
    /// release.
    pub fn initialize(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.envelope = 0.0;
        self.set_times(5.0, 200.0);
    }

    /// Derive the envelope coefficients from attack/release times in
    /// milliseconds: `coeff = e^(−1/(sr·t))`.
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32) {
        self.attack_coeff = (-1.0 / (self.sample_rate * attack_ms / 1000.0)).exp();
        self.release_coeff = (-1.0 / (self.sample_rate * release_ms / 1000.0)).exp();
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    /// Track the stereo dry input and return the gain to apply to the
    /// wet signal: 1.0 = untouched, 0.0 = fully ducked.
    ///
    /// Above `threshold`, the reduction grows with the overshoot scaled
    /// by `amount` (doubled so amount = 1 can reach full ducking at
    /// moderate overshoots), capped at total silence.
    #[inline]
    pub fn process_stereo(&mut self, left: f32, right: f32, threshold: f32, amount: f32) -> f32 {
        let peak = left.abs().max(right.abs());

        let coeff = if peak > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * peak;

        if self.envelope > threshold {
            let excess = self.envelope - threshold;
            let reduction = (excess * amount * 2.0).min(1.0);
            1.0 - reduction
        } else {
            1.0
        }
    }
}
