//! # Reverse Delay Line
//!
//! Plays the delay buffer *backwards*: the echo of a rising phrase comes
//! back falling, the classic tape-flip sound.
//!
//! ## Why Grains?
//!
//! A single read head sweeping backwards through a circular buffer hits a
//! hard discontinuity every time it laps the write head — the "tape" jumps
//! from the oldest audio straight to the newest, producing a loud click
//! once per cycle.
//!
//! Instead, we run two independent **grains**. Each grain picks a start
//! position just behind the write head, sweeps backwards for one chunk
//! (chunk length = the requested delay in samples), and is faded in and
//! out by a full raised-cosine (Hann) window over its lifetime:
//!
//! ```text
//! w(t) = 0.5 * (1 - cos(2π·t)),   t = counter / chunk_len
//! ```
//!
//! The second grain runs half a chunk out of phase with the first, so one
//! grain is always near full volume while the other is near silent and
//! restarting. Two Hann windows offset by half a period sum to exactly 1,
//! so a steady input passes at constant level with no seams.
//!
//! A grain adopts the *currently requested* chunk length only when its
//! counter wraps. Delay-time changes therefore take effect at grain
//! boundaries, up to one grain late — the price of click-free reversal.

use std::f32::consts::TAU;

/// One backwards-reading playback head.
#[derive(Clone)]
struct Grain {
    /// Buffer position this grain sweeps backwards from.
    start: usize,
    /// Progress through the current chunk (0..chunk_len).
    counter: usize,
    /// Chunk length adopted when this grain last (re)triggered.
    chunk_len: usize,
}

impl Default for Grain {
    fn default() -> Self {
        Self {
            start: 0,
            counter: 0,
            chunk_len: 2,
        }
    }
}

/// Reverse delay line: a circular buffer shared by two overlapping,
/// Hann-windowed grains.
///
/// `write()` behaves exactly like [`DelayLine`](super::delay_line::DelayLine);
/// `read()` is stateful (it advances both grains) and must be called once
/// per sample, paired with `write()`.
#[derive(Clone, Default)]
pub struct ReverseDelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    grains: [Grain; 2],
}

impl ReverseDelayLine {
    /// Allocate the circular buffer and stagger the two grains half a
    /// chunk apart. The initial chunk length (300ms) only matters until
    /// the first `read()` requests a real delay and the grains retrigger.
    pub fn initialize(&mut self, sample_rate: f32, max_delay_seconds: f32) {
        let capacity = (sample_rate * max_delay_seconds).ceil() as usize + 1;
        self.buffer = vec![0.0; capacity];
        self.write_pos = 0;

        let default_chunk = ((sample_rate * 0.3) as usize).max(2);
        self.grains[0] = Grain {
            start: 0,
            counter: 0,
            chunk_len: default_chunk,
        };
        self.grains[1] = Grain {
            start: 0,
            counter: default_chunk / 2,
            chunk_len: default_chunk,
        };
    }

    /// Clear the buffer and restore the half-chunk grain stagger.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;

        let chunk_len = self.grains[0].chunk_len;
        self.grains[0].start = 0;
        self.grains[0].counter = 0;
        self.grains[1].start = 0;
        self.grains[1].counter = chunk_len / 2;
        self.grains[1].chunk_len = chunk_len;
    }

    /// Store a sample at the write head and advance it, wrapping at the
    /// end of the buffer.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        if self.buffer.is_empty() {
            return;
        }
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Produce the next reversed sample and advance both grains.
    ///
    /// `delay_samples` sets the chunk length: how much audio gets reversed
    /// in one sweep. Values below 1 yield silence; otherwise the chunk is
    /// the integer part, floored at 2 so the Hann window always has room
    /// to open and close.
    #[inline]
    pub fn read(&mut self, delay_samples: f32) -> f32 {
        if self.buffer.is_empty() || delay_samples < 1.0 {
            return 0.0;
        }
        let len = self.buffer.len();
        let requested_chunk = (delay_samples as usize).max(2);

        let mut output = 0.0;
        for grain in &mut self.grains {
            // Sweep backwards: the grain's playback position is its start
            // minus how far it has progressed.
            let read_pos = if grain.start >= grain.counter {
                grain.start - grain.counter
            } else {
                grain.start + len - grain.counter
            };
            let sample = self.buffer[read_pos % len];

            let t = grain.counter as f32 / grain.chunk_len as f32;
            let window = 0.5 * (1.0 - (TAU * t).cos());
            output += sample * window;

            grain.counter += 1;
            if grain.counter >= grain.chunk_len {
                // Retrigger: adopt the current chunk length and start a
                // fresh backwards sweep from the newest written sample.
                grain.counter = 0;
                grain.chunk_len = requested_chunk;
                grain.start = if self.write_pos == 0 {
                    len - 1
                } else {
                    self.write_pos - 1
                };
            }
        }

        output
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
