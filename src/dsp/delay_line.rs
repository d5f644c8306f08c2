//! # Delay Line (Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! specified time delay. This is the fundamental building block of every
//! delay, echo, chorus, and flanger effect.
//!
//! ## How the Ring Buffer Works
//!
//! Imagine a circular tape loop. A "write head" records incoming audio, and
//! a "read head" plays it back from a position further behind on the tape.
//! The distance between the two heads is the delay time.
//!
//! In code, the "tape" is a `Vec<f32>` sized once at `initialize()` to hold
//! the maximum delay, and the write head is an integer index that wraps
//! back to 0 when it runs off the end. The buffer is never resized after
//! initialization, so changing the delay time never allocates — only the
//! read position moves.
//!
//! ## Fractional Reads
//!
//! Delay times rarely land on a whole number of samples (500ms at 48kHz is
//! exactly 24000 samples, but 10.007ms at 44.1kHz is 441.3). When the
//! requested position falls between two stored samples, we linearly
//! interpolate:
//!
//! ```text
//! result = sample_a * (1 - frac) + sample_b * frac
//! ```
//!
//! Without this, a continuously changing delay time would snap between
//! whole-sample positions and produce audible stepping ("zipper noise").

/// A circular buffer functioning as an audio delay line with linear
/// interpolation for fractional delay times.
///
/// The buffer is allocated once in [`initialize`](Self::initialize) and
/// cleared — never reallocated — afterwards. An uninitialized (empty) line
/// reads as silence and ignores writes.
#[derive(Clone, Default)]
pub struct DelayLine {
    /// Circular sample storage. Empty until `initialize()` is called.
    buffer: Vec<f32>,

    /// Where the next incoming sample will be stored. Advances by one on
    /// every `write()`, wrapping at the buffer length.
    write_pos: usize,
}

impl DelayLine {
    /// Allocate a zero-filled buffer large enough for `max_delay_seconds`
    /// of audio at `sample_rate`, plus one slot of slack for interpolation
    /// at the maximum delay.
    pub fn initialize(&mut self, sample_rate: f32, max_delay_seconds: f32) {
        let capacity = (sample_rate * max_delay_seconds).ceil() as usize + 1;
        self.buffer = vec![0.0; capacity];
        self.write_pos = 0;
    }

    /// Clear the buffer to silence and rewind the write head.
    ///
    /// Called when playback stops so stale echoes don't bleed into the
    /// next play session.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Store a sample at the write head and advance it by one slot,
    /// wrapping at the end of the buffer.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read a delayed sample, `delay_samples` behind the most recent write.
    ///
    /// `delay_samples` may be fractional; the result is a linear blend of
    /// the two nearest stored samples. `read(0.0)` returns the most
    /// recently written sample.
    ///
    /// # The index math
    ///
    /// The most recent sample sits at `write_pos - 1` (the head already
    /// advanced past it), so the read position is:
    ///
    /// ```text
    /// read_pos = write_pos - delay_samples - 1
    /// ```
    ///
    /// which is wrapped back into the buffer by adding the buffer length
    /// until it's non-negative. Requests longer than the buffer wrap all
    /// the way around — musically undefined, but never a crash. Callers
    /// that care should bound `delay_samples` to `capacity - 1`.
    ///
    /// Reading has no side effects: the same arguments against the same
    /// buffer state always return the same value.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        let len = self.buffer.len();

        let mut read_pos = self.write_pos as f32 - delay_samples - 1.0;
        while read_pos < 0.0 {
            read_pos += len as f32;
        }

        // Split into the slot index and the fractional blend amount.
        let index_a = read_pos as usize % len;
        let index_b = (index_a + 1) % len;
        let frac = read_pos - read_pos.floor();

        let sample_a = self.buffer[index_a];
        let sample_b = self.buffer[index_b];

        // frac = 0.0 → exactly sample_a; frac = 0.5 → equal blend.
        sample_a * (1.0 - frac) + sample_b * frac
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
