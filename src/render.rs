//! Offline rendering of cue sessions to sample buffers.
//!
//! Drives a [`CueEngine`] over the reference synth backend in exact tick
//! steps and collects the mixed output, for listening tests, tuning the
//! palette, and WAV export (feature `wav-export`).

use std::time::Duration;

use crate::cue::Cue;
use crate::engine::{CueEngine, EngineConfig};
use crate::signal::Signal;
use crate::synth::{SynthFactory, SynthMixer};

/// Renders engine activity to a mono sample buffer.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chime::{Cue, EngineConfig};
/// use chime::render::OfflineRenderer;
///
/// let mut renderer = OfflineRenderer::new(EngineConfig::default(), 44_100);
/// renderer.engine_mut().trigger(Cue::Success);
/// renderer.run_until_idle(Duration::from_secs(5));
///
/// let samples = renderer.into_samples();
/// assert!(!samples.is_empty());
/// ```
pub struct OfflineRenderer {
    engine: CueEngine<SynthFactory>,
    mixer: SynthMixer,
    sample_rate: u32,
    samples_per_tick: usize,
    samples: Vec<f64>,
}

impl OfflineRenderer {
    /// Creates a renderer with its own engine and synth backend.
    pub fn new(config: EngineConfig, sample_rate: u32) -> Self {
        let factory = SynthFactory::new(f64::from(sample_rate));
        let mixer = factory.mixer();
        let samples_per_tick =
            (u64::from(sample_rate) * u64::from(config.tick_interval_ms) / 1000).max(1) as usize;
        Self {
            engine: CueEngine::with_config(factory, config),
            mixer,
            sample_rate,
            samples_per_tick,
            samples: Vec::new(),
        }
    }

    /// The engine to trigger cues and ambient on.
    pub fn engine_mut(&mut self) -> &mut CueEngine<SynthFactory> {
        &mut self.engine
    }

    /// Render sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples rendered so far.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Renders (at least) the given duration of audio, tick by tick.
    pub fn run_for(&mut self, duration: Duration) {
        let tick = self.engine.tick_interval();
        let mut remaining = duration;
        while remaining > Duration::ZERO {
            self.render_tick(tick);
            remaining = remaining.saturating_sub(tick);
        }
    }

    /// Renders until the engine goes idle, bounded by `limit`.
    pub fn run_until_idle(&mut self, limit: Duration) {
        let tick = self.engine.tick_interval();
        let mut rendered = Duration::ZERO;
        while !self.engine.is_idle() && rendered < limit {
            self.render_tick(tick);
            rendered += tick;
        }
    }

    /// Consumes the renderer and returns the buffer.
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    fn render_tick(&mut self, tick: Duration) {
        self.engine.advance(tick);
        let start = self.samples.len();
        self.samples.resize(start + self.samples_per_tick, 0.0);
        self.mixer.process(&mut self.samples[start..]);
    }
}

/// Renders one cue in isolation and returns its samples.
pub fn render_cue(cue: Cue, config: EngineConfig, sample_rate: u32) -> Vec<f64> {
    let mut renderer = OfflineRenderer::new(config, sample_rate);
    renderer.engine_mut().trigger(cue);
    renderer.run_until_idle(Duration::from_secs(10));
    renderer.into_samples()
}

/// Writes samples as a 16-bit mono WAV file.
#[cfg(feature = "wav-export")]
pub fn write_wav(
    path: impl AsRef<std::path::Path>,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f64::from(i16::MAX)) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()
}
