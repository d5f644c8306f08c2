//! # Stereo Modulator
//!
//! A twin-phase sine LFO that wobbles the two channels' delay times for
//! chorus/vibrato movement in Analog mode. The right phase starts half a
//! cycle ahead of the left, so the channels are never in phase — one ear
//! hears the pitch bending up while the other hears it bending down,
//! which reads as stereo width rather than mono vibrato.

use std::f32::consts::TAU;

/// Two sine LFO phases sharing one rate, phases kept in [0, 1).
#[derive(Clone, Copy)]
pub struct StereoModulator {
    sample_rate: f32,
    phase_left: f32,
    phase_right: f32,
}

impl Default for StereoModulator {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            phase_left: 0.0,
            phase_right: 0.5,
        }
    }
}

impl StereoModulator {
    pub fn initialize(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    /// Rewind both phases, keeping the half-cycle stereo offset.
    pub fn reset(&mut self) {
        self.phase_left = 0.0;
        self.phase_right = 0.5;
    }

    /// Offset each channel's base delay by a sine wobble of up to
    /// `max_mod_samples`, then advance both phases by `rate_hz`.
    #[inline]
    pub fn modulated_delays(
        &mut self,
        base_delay_left: f32,
        base_delay_right: f32,
        max_mod_samples: f32,
        rate_hz: f32,
    ) -> (f32, f32) {
        let mod_left = (TAU * self.phase_left).sin();
        let mod_right = (TAU * self.phase_right).sin();

        let phase_inc = rate_hz / self.sample_rate;
        self.phase_left += phase_inc;
        self.phase_right += phase_inc;
        if self.phase_left >= 1.0 {
            self.phase_left -= 1.0;
        }
        if self.phase_right >= 1.0 {
            self.phase_right -= 1.0;
        }

        (
            base_delay_left + mod_left * max_mod_samples,
            base_delay_right + mod_right * max_mod_samples,
        )
    }
}
