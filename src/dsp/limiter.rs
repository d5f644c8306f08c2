//! # Safety Limiter
//!
//! The last line of defense before the output. A delay with 95% feedback,
//! drive, and modulation can be coaxed into levels that would clip the
//! host hard; this limiter rides the output gain so that never happens.
//!
//! Two smoothed followers run in series:
//!
//! 1. A **peak envelope** (1ms attack / 100ms release) tracks the joint
//!    stereo output level.
//! 2. When the envelope exceeds the 0.95 ceiling, the **target gain**
//!    becomes `ceiling / envelope`; the applied gain then chases the
//!    target with its own fast-attack (1ms) / gentle-release (120ms)
//!    smoothing, so reduction engages immediately but lets go without
//!    pumping.
//!
//! This is a safety net, not a creative effect — the engine applies it
//! unconditionally and it cannot be bypassed.

/// Peak-envelope feedback limiter with smoothed gain reduction.
#[derive(Clone, Copy)]
pub struct SafetyLimiter {
    env_attack: f32,
    env_release: f32,
    gain_attack: f32,
    gain_release: f32,
    envelope: f32,
    gain: f32,
}

impl SafetyLimiter {
    /// Output ceiling; gain reduction engages above this level.
    pub const THRESHOLD: f32 = 0.95;

    const ENV_ATTACK_SECS: f32 = 0.001;
    const ENV_RELEASE_SECS: f32 = 0.100;
    const GAIN_ATTACK_SECS: f32 = 0.001;
    const GAIN_RELEASE_SECS: f32 = 0.120;

    /// Precompute all four smoothing coefficients for the sample rate.
    pub fn initialize(&mut self, sample_rate: f32) {
        let coeff = |secs: f32| (-1.0 / (sample_rate * secs)).exp();
        self.env_attack = coeff(Self::ENV_ATTACK_SECS);
        self.env_release = coeff(Self::ENV_RELEASE_SECS);
        self.gain_attack = coeff(Self::GAIN_ATTACK_SECS);
        self.gain_release = coeff(Self::GAIN_RELEASE_SECS);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.gain = 1.0;
    }

    /// Feed the current stereo peak (max of both channels' magnitudes)
    /// and get back the gain to apply to both channels.
    #[inline]
    pub fn process(&mut self, stereo_peak: f32) -> f32 {
        // Peak follower.
        let env_coeff = if stereo_peak > self.envelope {
            self.env_attack
        } else {
            self.env_release
        };
        self.envelope = env_coeff * self.envelope + (1.0 - env_coeff) * stereo_peak;

        let target = if self.envelope > Self::THRESHOLD {
            Self::THRESHOLD / self.envelope.max(1e-6)
        } else {
            1.0
        };

        // Chase the target: fast when clamping down, gentle when letting go.
        let gain_coeff = if target < self.gain {
            self.gain_attack
        } else {
            self.gain_release
        };
        self.gain = gain_coeff * self.gain + (1.0 - gain_coeff) * target;

        self.gain
    }
}

impl Default for SafetyLimiter {
    fn default() -> Self {
        Self {
            env_attack: 0.0,
            env_release: 0.0,
            gain_attack: 0.0,
            gain_release: 0.0,
            envelope: 0.0,
            gain: 1.0,
        }
    }
}
