//! # DSP (Digital Signal Processing) Primitives
//!
//! This module contains the core building blocks for our delay effect:
//!
//! - **`delay_line`**: A ring buffer that stores past audio samples and
//!   retrieves them after a specified (fractional) delay. This is the
//!   heart of any time-based audio effect.
//!
//! - **`reverse_delay`**: A variant of the delay line that plays its
//!   contents backwards through overlapping windowed grains, for
//!   reversed echoes without clicks.
//!
//! - **`filter`**: Biquad highpass/lowpass filters that shape the tone
//!   of the repeats, plus the one-pole smoother used for click-free
//!   parameter changes.
//!
//! - **`saturator`**: Soft-clipping waveshaper that adds tape-style
//!   harmonic warmth to the feedback path.
//!
//! - **`modulator`**: A twin-phase LFO that gently wobbles the two
//!   channels' delay times for analog-style chorusing.
//!
//! - **`ducker`**: An envelope follower that pushes the echoes down
//!   while the dry signal is playing.
//!
//! - **`limiter`**: A last-resort peak limiter that keeps runaway
//!   feedback from ever exceeding full scale.
//!
//! - **`engine`**: The stereo delay engine that wires all of the above
//!   into one per-sample processing loop.

pub mod delay_line;
pub mod ducker;
pub mod engine;
pub mod filter;
pub mod limiter;
pub mod modulator;
pub mod reverse_delay;
pub mod saturator;
