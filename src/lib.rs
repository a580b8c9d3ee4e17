//! Chime - envelope-driven sound cues for user interfaces.
//!
//! This library provides a small cue engine: named one-shot sounds
//! (hover, click, success, ...) and a single pointer-modulated ambient
//! bed, each shaped by an attack → hold → release amplitude envelope that
//! advances on a shared tick scheduler.
//!
//! The engine is backend-agnostic: it drives [`Voice`] handles obtained
//! from an injected [`VoiceFactory`], and the `synth` feature (default)
//! ships a reference software backend so the crate is playable out of the
//! box. Failures never propagate to the UI: a sound engine is decoration,
//! and it degrades to silence instead of crashing its caller.
//!
//! ```
//! use std::time::Duration;
//! use chime::{Cue, CueEngine, SynthFactory};
//!
//! let factory = SynthFactory::new(44_100.0);
//! let mixer = factory.mixer(); // hand this to the audio callback
//! let mut engine = CueEngine::new(factory);
//!
//! engine.trigger(Cue::Click);
//! engine.start_ambient();
//! engine.modulate_ambient(30.0, 70.0, 100.0, 100.0);
//!
//! // Drive the engine from the host clock.
//! engine.advance(Duration::from_millis(16));
//!
//! engine.stop_ambient();
//! engine.advance(Duration::from_secs(1));
//! assert!(engine.is_idle());
//! # let _ = mixer;
//! ```

pub mod cue;
pub mod engine;
pub mod envelope;
pub mod error;
#[cfg(feature = "synth")]
pub mod render;
pub mod scheduler;
pub mod signal;
#[cfg(feature = "synth")]
pub mod synth;
pub mod voice;

// Re-export commonly used types at the crate root
pub use cue::{Cue, CueRegistry, CueSpec};
pub use engine::{AmbientConfig, CueEngine, EngineConfig};
pub use envelope::{Curve, EnvelopePhase, EnvelopeRun, EnvelopeSpec};
pub use error::{CueError, VoiceError};
pub use scheduler::{TickHandle, TickScheduler};
pub use signal::Signal;
pub use voice::{TremoloSpec, Voice, VoiceFactory, VoiceKind, VoiceSpec, Waveform};

#[cfg(feature = "synth")]
pub use synth::{SynthFactory, SynthMixer, SynthVoice};
