//! The cue engine: named one-shot cues plus a single ambient bed.
//!
//! The engine owns any number of transient envelope runs and at most one
//! persistent ambient voice. Everything advances on one shared
//! [`TickScheduler`]; the host drives it with [`CueEngine::advance`] from
//! its own clock (an audio callback, a UI frame loop, a render loop).
//!
//! Failures never reach the caller: a missing backend disables the engine
//! for the session, a failed voice allocation drops that one cue, and both
//! are logged. Sound is decoration; the engine must never take the UI down
//! with it.

use std::time::Duration;

use crate::cue::{Cue, CueRegistry};
use crate::envelope::{EnvelopePhase, EnvelopeRun};
use crate::error::{CueError, Result, VoiceError};
use crate::scheduler::{TickHandle, TickScheduler};
use crate::voice::{TremoloSpec, Voice, VoiceFactory, VoiceKind, VoiceSpec};

/// Engine-wide configuration.
///
/// `enabled` and `volume` may change at runtime via
/// [`CueEngine::configure`]; the tick interval and ambient table are fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Master switch; a disabled engine ignores every trigger
    pub enabled: bool,
    /// Master volume in [0, 1], scaled by each cue's peak factor
    pub volume: f64,
    /// Scheduler tick interval in milliseconds
    pub tick_interval_ms: u32,
    /// Ambient-bed tuning
    pub ambient: AmbientConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.2,
            tick_interval_ms: 10,
            ambient: AmbientConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Sets the master volume, clamped to [0, 1].
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Sets the master switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the scheduler tick interval.
    pub fn with_tick_interval_ms(mut self, interval_ms: u32) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    /// Replaces the ambient tuning.
    pub fn with_ambient(mut self, ambient: AmbientConfig) -> Self {
        self.ambient = ambient;
        self
    }
}

/// Tuning for the ambient bed.
///
/// The numbers are configuration, not contract; the defaults are the
/// palette the cue set was tuned with. Pointer modulation maps the
/// normalized x coordinate across `[cutoff_min, cutoff_max]` and the
/// normalized y coordinate across
/// `[mod_volume_floor, 1.0] x volume x mod_gain`.
#[derive(Debug, Clone, Copy)]
pub struct AmbientConfig {
    /// Low-pass cutoff of the ambient noise voice in Hz
    pub cutoff: f64,
    /// Steady-state level as a fraction of master volume
    pub gain: f64,
    /// Level scale while pointer-modulated, as a fraction of master volume
    pub mod_gain: f64,
    /// Fraction of the modulated level kept at the top of the screen
    pub mod_volume_floor: f64,
    /// Cutoff mapped to the left screen edge, in Hz
    pub cutoff_min: f64,
    /// Cutoff mapped to the right screen edge, in Hz
    pub cutoff_max: f64,
    /// Fade-in ramp duration in milliseconds
    pub fade_in_ms: u32,
    /// Fade-out ramp duration in milliseconds
    pub fade_out_ms: u32,
    /// Amplitude wobble on the ambient voice
    pub tremolo: Option<TremoloSpec>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            cutoff: 400.0,
            gain: 0.6,
            mod_gain: 0.15,
            mod_volume_floor: 0.5,
            cutoff_min: 200.0,
            cutoff_max: 1200.0,
            fade_in_ms: 750,
            fade_out_ms: 600,
            tremolo: Some(TremoloSpec::default()),
        }
    }
}

/// Fade state of the ambient bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadePhase {
    FadingIn,
    Steady,
    FadingOut,
}

/// The single ambient voice and its fade, when one is alive.
///
/// Invariants: the engine holds at most one of these; a fade handle exists
/// only while a fade is in progress and never outlives the voice.
struct AmbientRun<V: Voice> {
    voice: Option<V>,
    phase: FadePhase,
    level: f64,
    fade_from: f64,
    fade_to: f64,
    fade_ticks: u32,
    phase_ticks: u32,
    handle: Option<TickHandle>,
}

impl<V: Voice> AmbientRun<V> {
    fn set_level(&mut self, level: f64) {
        self.level = level.clamp(0.0, 1.0);
        if let Some(voice) = self.voice.as_mut() {
            voice.set_volume(self.level);
        }
    }

    fn set_filter_cutoff(&mut self, cutoff: f64) {
        if let Some(voice) = self.voice.as_mut() {
            voice.set_filter_cutoff(cutoff);
        }
    }

    /// Stops the voice; safe to call more than once.
    fn stop_voice(&mut self) {
        if let Some(mut voice) = self.voice.take() {
            voice.set_volume(0.0);
            voice.stop();
        }
    }
}

/// Envelope-driven sound-cue engine.
///
/// Construct one per process with an injected [`VoiceFactory`], wire its
/// trigger methods to UI events, and call [`advance`](Self::advance) from
/// the host clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chime::{Cue, CueEngine, SynthFactory};
///
/// let factory = SynthFactory::new(44_100.0);
/// let mut engine = CueEngine::new(factory);
///
/// engine.trigger(Cue::Click);
/// assert_eq!(engine.active_cue_count(), 1);
///
/// // The click envelope spans 115ms; drive the clock past it.
/// engine.advance(Duration::from_millis(200));
/// assert!(engine.is_idle());
/// ```
pub struct CueEngine<F: VoiceFactory> {
    factory: F,
    config: EngineConfig,
    registry: CueRegistry,
    scheduler: TickScheduler,
    runs: Vec<EnvelopeRun<F::Voice>>,
    ambient: Option<AmbientRun<F::Voice>>,
    backend_warned: bool,
}

impl<F: VoiceFactory> CueEngine<F> {
    /// Creates an engine with the default configuration and cue palette.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    ///
    /// Backend availability is checked here as well as per call; an engine
    /// over a dead backend starts out disabled.
    pub fn with_config(factory: F, config: EngineConfig) -> Self {
        let mut engine = Self {
            scheduler: TickScheduler::new(config.tick_interval_ms),
            factory,
            config,
            registry: CueRegistry::default(),
            runs: Vec::new(),
            ambient: None,
            backend_warned: false,
        };
        if engine.factory.is_available() {
            log::debug!("cue engine ready");
        } else {
            engine.absorb(CueError::BackendUnavailable);
        }
        engine
    }

    /// Replaces the cue palette.
    pub fn with_registry(mut self, registry: CueRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the master switch and volume.
    ///
    /// Takes effect for subsequent triggers; envelopes already in flight
    /// keep the peak they were started with.
    pub fn configure(&mut self, enabled: bool, volume: f64) {
        self.config.enabled = enabled;
        self.config.volume = volume.clamp(0.0, 1.0);
    }

    /// Sets the master switch.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Sets the master volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f64) {
        self.config.volume = volume.clamp(0.0, 1.0);
    }

    /// Flips the master switch and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.config.enabled = !self.config.enabled;
        self.config.enabled
    }

    /// True when the engine will act on triggers.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Current master volume.
    pub fn volume(&self) -> f64 {
        self.config.volume
    }

    /// The cue palette in use.
    pub fn registry(&self) -> &CueRegistry {
        &self.registry
    }

    /// Number of one-shot envelopes currently in flight.
    pub fn active_cue_count(&self) -> usize {
        self.runs.len()
    }

    /// True while an ambient voice is alive (fading counts).
    pub fn ambient_active(&self) -> bool {
        self.ambient.is_some()
    }

    /// True when nothing is playing and nothing is scheduled.
    pub fn is_idle(&self) -> bool {
        self.runs.is_empty() && self.ambient.is_none()
    }

    /// Number of live tick subscriptions. Diagnostic: an idle engine holds
    /// zero.
    pub fn live_tick_handles(&self) -> usize {
        self.scheduler.live_count()
    }

    /// The scheduler's tick interval.
    pub fn tick_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Plays a one-shot cue.
    ///
    /// Silent no-op when the engine is disabled. Backend failures are
    /// absorbed and logged (see [`CueError`] for the policy per failure).
    pub fn trigger(&mut self, cue: Cue) {
        if !self.config.enabled {
            return;
        }
        if let Err(err) = self.try_trigger(cue) {
            self.absorb(err);
        }
    }

    /// Plays a one-shot cue by its snake_case name.
    ///
    /// An unknown name asserts in development builds (it is a programmer
    /// error) and degrades to a logged no-op in release builds.
    pub fn trigger_named(&mut self, name: &str) {
        if !self.config.enabled {
            return;
        }
        match Cue::from_name(name) {
            Some(cue) => self.trigger(cue),
            None => {
                if cfg!(debug_assertions) {
                    panic!("unknown cue: {name}");
                }
                self.absorb(CueError::UnknownCue(name.to_string()));
            }
        }
    }

    /// Starts (or restarts) the ambient bed.
    ///
    /// Any existing ambient voice is fully torn down first (voice stopped,
    /// fade cancelled) before the new one is created, in one
    /// non-interruptible step, so two ambient voices never coexist. The new
    /// voice fades from silence to `volume x ambient gain`.
    pub fn start_ambient(&mut self) {
        if !self.config.enabled {
            return;
        }
        if let Err(err) = self.try_start_ambient() {
            self.absorb(err);
        }
    }

    /// Fades the ambient bed out and releases it.
    ///
    /// No-op when no ambient voice is alive. A stop that lands while a
    /// fade-in is still running cancels that fade first, so only one ramp
    /// ever drives the voice; a stop that lands during an ongoing stop
    /// collapses into it. The voice is stopped exactly once.
    pub fn stop_ambient(&mut self) {
        let Some(run) = self.ambient.as_mut() else {
            return;
        };
        if run.phase == FadePhase::FadingOut {
            return;
        }

        if let Some(handle) = run.handle.take() {
            self.scheduler.cancel(handle);
        }

        let fade_ticks = self.scheduler.ticks_for(self.config.ambient.fade_out_ms);
        if fade_ticks == 0 {
            self.teardown_ambient();
            return;
        }

        run.phase = FadePhase::FadingOut;
        run.fade_from = run.level;
        run.fade_to = 0.0;
        run.fade_ticks = fade_ticks;
        run.phase_ticks = 0;
        run.handle = Some(self.scheduler.schedule_repeating());
        log::debug!("ambient bed stopping");
    }

    /// Steers the ambient bed from a pointer position.
    ///
    /// Maps `x/width` across the configured cutoff range and `y/height`
    /// across the modulated volume range, applying both immediately with no
    /// ramp, since this is called at pointer-move rate. No-op when no ambient
    /// voice is alive or the extents are degenerate.
    pub fn modulate_ambient(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some(run) = self.ambient.as_mut() else {
            return;
        };

        let ambient = &self.config.ambient;
        let nx = (x / width).clamp(0.0, 1.0);
        let ny = (y / height).clamp(0.0, 1.0);

        let cutoff = ambient.cutoff_min + nx * (ambient.cutoff_max - ambient.cutoff_min);
        let level = self.config.volume
            * ambient.mod_gain
            * (ambient.mod_volume_floor + ny * (1.0 - ambient.mod_volume_floor));

        run.set_filter_cutoff(cutoff);
        run.set_level(level);
    }

    /// Immediately silences everything: one-shots cancelled, ambient torn
    /// down, all tick subscriptions cleared. Every voice is still stopped
    /// exactly once.
    pub fn stop_all(&mut self) {
        for mut run in self.runs.drain(..) {
            self.scheduler.cancel(run.handle());
            run.cancel();
        }
        self.teardown_ambient();
    }

    /// Drives the engine from the host clock.
    ///
    /// Converts `elapsed` into due ticks and advances every in-flight
    /// envelope and ambient fade. Uneven call cadence is fine; leftover
    /// time carries into the next call.
    pub fn advance(&mut self, elapsed: Duration) {
        let due = self.scheduler.advance(elapsed);
        for _ in 0..due {
            self.step_tick();
        }
    }

    fn try_trigger(&mut self, cue: Cue) -> Result<()> {
        if !self.factory.is_available() {
            return Err(CueError::BackendUnavailable);
        }
        let spec = *self
            .registry
            .get(cue)
            .ok_or_else(|| CueError::UnknownCue(cue.name().to_string()))?;

        let voice = self
            .factory
            .create_voice(&spec.voice_spec())
            .map_err(Self::classify)?;

        let peak = self.config.volume * spec.envelope.peak;
        let run = EnvelopeRun::new(voice, spec.envelope, peak, &mut self.scheduler);
        if run.is_done() {
            // Zero-length envelope: completed at construction.
            self.scheduler.cancel(run.handle());
        } else {
            self.runs.push(run);
        }
        log::debug!("cue {} started", cue.name());
        Ok(())
    }

    fn try_start_ambient(&mut self) -> Result<()> {
        if !self.factory.is_available() {
            return Err(CueError::BackendUnavailable);
        }

        // Teardown-then-create is one non-interruptible unit: the old voice
        // and its fade are fully gone before the new voice exists.
        self.teardown_ambient();

        let ambient = self.config.ambient;
        let spec = VoiceSpec {
            kind: VoiceKind::Noise,
            frequency: ambient.cutoff,
            tremolo: ambient.tremolo,
        };
        let mut voice = self.factory.create_voice(&spec).map_err(Self::classify)?;
        voice.set_volume(0.0);
        voice.play();

        let target = (self.config.volume * ambient.gain).clamp(0.0, 1.0);
        let fade_ticks = self.scheduler.ticks_for(ambient.fade_in_ms);
        let mut run = AmbientRun {
            voice: Some(voice),
            phase: FadePhase::FadingIn,
            level: 0.0,
            fade_from: 0.0,
            fade_to: target,
            fade_ticks,
            phase_ticks: 0,
            handle: None,
        };
        if fade_ticks == 0 {
            run.set_level(target);
            run.phase = FadePhase::Steady;
        } else {
            run.handle = Some(self.scheduler.schedule_repeating());
        }
        self.ambient = Some(run);
        log::debug!("ambient bed started");
        Ok(())
    }

    /// Advances every envelope by one tick and reaps finished ones.
    fn step_tick(&mut self) {
        let mut i = 0;
        while i < self.runs.len() {
            if self.runs[i].tick() == EnvelopePhase::Done {
                let run = self.runs.swap_remove(i);
                self.scheduler.cancel(run.handle());
            } else {
                i += 1;
            }
        }
        self.step_ambient();
    }

    fn step_ambient(&mut self) {
        let Some(run) = self.ambient.as_mut() else {
            return;
        };
        // Steady state has no fade scheduled and nothing to do.
        if run.handle.is_none() {
            return;
        }

        run.phase_ticks += 1;
        let progress = (f64::from(run.phase_ticks) / f64::from(run.fade_ticks.max(1))).min(1.0);
        let level = run.fade_from + (run.fade_to - run.fade_from) * progress;
        run.set_level(level);

        if run.phase_ticks < run.fade_ticks {
            return;
        }

        match run.phase {
            FadePhase::FadingIn => {
                if let Some(handle) = run.handle.take() {
                    self.scheduler.cancel(handle);
                }
                run.phase = FadePhase::Steady;
            }
            FadePhase::Steady => {}
            FadePhase::FadingOut => {
                self.teardown_ambient();
            }
        }
    }

    /// Releases the ambient slot: fade cancelled, voice stopped once.
    fn teardown_ambient(&mut self) {
        if let Some(mut run) = self.ambient.take() {
            if let Some(handle) = run.handle.take() {
                self.scheduler.cancel(handle);
            }
            run.stop_voice();
        }
    }

    fn classify(err: VoiceError) -> CueError {
        match err {
            VoiceError::Unavailable => CueError::BackendUnavailable,
            other => CueError::VoiceCreationFailed(other),
        }
    }

    /// Terminal handling for every absorbed failure.
    fn absorb(&mut self, err: CueError) {
        match err {
            CueError::BackendUnavailable => {
                self.config.enabled = false;
                if !self.backend_warned {
                    self.backend_warned = true;
                    log::warn!("audio backend unavailable; cues disabled for this session");
                }
            }
            CueError::UnknownCue(name) => {
                log::error!("unknown cue requested: {name}");
            }
            CueError::VoiceCreationFailed(err) => {
                log::warn!("voice creation failed, cue dropped: {err}");
            }
        }
    }
}
