//! # Driftline Delay — A VST3/CLAP Stereo Delay Plugin
//!
//! A stereo echo effect built with [nih-plug](https://github.com/robbert-vdh/nih-plug):
//! tempo-syncable delay times, granular reverse playback, ping-pong
//! routing, tone shaping, tape-style saturation and modulation, input
//! ducking, and a safety limiter on the way out.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────── × (1 - mix) ─────┐
//!         │                                                      │
//!         │    ┌────────────────────────────────────────────┐    │
//!         │    │              FEEDBACK LOOP                 │    │
//!         │    │                                            │    │
//!         └──►(+)──► [Delay / Reverse Line] ──► [Tone] ──►  │    │
//!              ▲      (forward ring buffer     [Saturator]  │    │
//!              │       or reverse grains)           │       │    │
//!              │                                    ▼       │    │
//!              │                             × feedback ────┘    │
//!              │                                    │            │
//!              └────────────────────────────────────│            │
//!                                                   ▼            ▼
//!                              × duck gain × mix ──►(+)──► × trim ──► [Limiter] ──► Output
//! ```
//!
//! All of the per-sample work lives in [`dsp::engine::DelayEngine`];
//! this file is only the glue between the host and the engine: parameter
//! snapshots, transport tempo, channel plumbing, and tail reporting.

mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::engine::{DelayEngine, EngineParams};
use nih_plug::prelude::*;
use params::DriftlineParams;

/// The main plugin struct.
///
/// Parameters (`DriftlineParams`) are shared with the host via `Arc` and
/// can be read from any thread. The engine is owned exclusively by the
/// audio thread and only touched in `process()`, which keeps the design
/// thread-safe without locks.
struct DriftlineDelay {
    params: Arc<DriftlineParams>,

    /// All audio-rate state: delay lines, filters, envelopes. Allocated
    /// once in `initialize()`, then mutated in place forever after.
    engine: DelayEngine,

    /// Sample rate from the host, for tail-length math.
    sample_rate: f32,

    /// How many input channels the host connected. With a mono input
    /// both engine channels are fed the same signal, and the processed
    /// left channel is duplicated into both outputs afterwards.
    num_input_channels: usize,
}

impl Default for DriftlineDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(DriftlineParams::default()),
            engine: DelayEngine::default(),
            // Placeholders until initialize() reports the real config.
            sample_rate: 44100.0,
            num_input_channels: 2,
        }
    }
}

impl DriftlineDelay {
    /// Snapshot every parameter into a plain struct the engine can
    /// consume without knowing anything about nih-plug.
    fn snapshot_params(&self, tempo_bpm: Option<f32>) -> EngineParams {
        EngineParams {
            delay_time_ms: self.params.delay_time.value(),
            tempo_sync: self.params.tempo_sync.value(),
            note_division: self.params.note_division.value(),
            tempo_bpm,
            reverse: self.params.reverse.value(),
            feedback: self.params.feedback.value(),
            mix: self.params.mix.value(),
            trim_db: self.params.trim.value(),
            mode: self.params.mode.value(),
            ping_pong: self.params.ping_pong.value(),
            stereo_offset_ms: self.params.stereo_offset.value(),
            highpass_hz: self.params.highpass.value(),
            lowpass_hz: self.params.lowpass.value(),
            mod_rate_hz: self.params.mod_rate.value(),
            mod_depth: self.params.mod_depth.value(),
            drive: self.params.drive.value(),
            duck_amount: self.params.duck_amount.value(),
            duck_threshold: self.params.duck_threshold.value(),
        }
    }
}

impl Plugin for DriftlineDelay {
    const NAME: &'static str = "Driftline Delay";
    const VENDOR: &'static str = "Driftline Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "hello@driftline.audio";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Supported audio channel layouts. The host picks the first layout
    // that matches the track configuration. The engine is inherently
    // stereo (ping-pong, stereo offset, twin-phase modulation), so the
    // plugin always outputs two channels.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        // Mono in, stereo out.
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded or the audio configuration
    /// changes. All buffer allocation happens here; `process()` never
    /// allocates.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        self.sample_rate = buffer_config.sample_rate;
        self.num_input_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        self.engine.prepare(self.sample_rate);

        nih_log!(
            "initialized: {} Hz, {} input channel(s)",
            self.sample_rate,
            self.num_input_channels
        );

        true
    }

    /// Clear all delay buffers and envelopes so stale echoes don't bleed
    /// into the next playback after a stop.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // Tempo comes from the transport when the host provides one;
        // tempo-synced delay falls back to the manual knob otherwise.
        let tempo_bpm = context.transport().tempo.map(|t| t as f32);
        let snapshot = self.snapshot_params(tempo_bpm);

        let mono_input = self.num_input_channels < 2;
        if let [left, right] = buffer.as_slice() {
            if mono_input {
                // Both engine channels see the mono input, so ping-pong's
                // mono sum and the right delay line get the full signal.
                right.copy_from_slice(left);
            }
            self.engine.process_block(left, right, &snapshot);
            if mono_input {
                // Up-mix: duplicate the processed channel into both outputs.
                right.copy_from_slice(left);
            }
        }

        // Report the feedback tail so the host keeps calling process()
        // after the input goes silent instead of truncating the echoes.
        // Each repeat is one delay period quieter by the feedback factor;
        // feedback^N = 0.001 (-60 dB) gives N = -3 / log10(feedback).
        let delay_samples = snapshot.effective_delay_ms() * self.sample_rate / 1000.0;
        let feedback = snapshot.feedback.clamp(0.0, 0.95);
        let tail_samples = if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10();
            (repeats * delay_samples) as u32
        } else {
            // No feedback: one delay period for the single echo.
            delay_samples as u32
        };

        ProcessStatus::Tail(tail_samples)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for DriftlineDelay {
    const CLAP_ID: &'static str = "com.driftline-audio.driftline-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo delay with reverse, ping-pong, tape character, and ducking");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for DriftlineDelay {
    // 16-byte class ID, globally unique across all VST3 plugins.
    const VST3_CLASS_ID: [u8; 16] = *b"DriftlineDelay01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(DriftlineDelay);
nih_export_vst3!(DriftlineDelay);
