//! Tick-driven envelope state machine.

use super::EnvelopeSpec;
use crate::scheduler::{TickHandle, TickScheduler};
use crate::voice::Voice;

/// Phase of an in-flight envelope.
///
/// Phases only ever advance: `Attack → Hold → Release → Done`, with no
/// back-edges. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    /// Ramping from 0 to the effective peak
    Attack,
    /// Holding at peak; a countdown, the level is not re-stepped
    Hold,
    /// Ramping from the current level to 0
    Release,
    /// Voice stopped, tick subscription dead
    Done,
}

/// Runtime state of one envelope over one voice.
///
/// A run owns its voice exclusively and stops it exactly once, when the
/// release ramp completes or [`cancel`](Self::cancel) forces it down. The
/// level is monotone non-decreasing during `Attack`, constant during
/// `Hold`, monotone non-increasing during `Release`, and clamped to
/// `[0, peak]` throughout.
///
/// The run carries exactly one [`TickHandle`]; whoever drives the run is
/// responsible for cancelling that handle on the scheduler once the run
/// reaches `Done`, so that no subscription outlives its envelope.
pub struct EnvelopeRun<V: Voice> {
    /// Voice under the envelope; taken (and stopped) exactly once
    voice: Option<V>,
    spec: EnvelopeSpec,
    /// Effective peak volume: master volume x spec peak factor
    peak: f64,
    phase: EnvelopePhase,
    level: f64,
    /// Ticks completed in the current phase
    phase_ticks: u32,
    attack_ticks: u32,
    hold_ticks: u32,
    release_ticks: u32,
    /// Level captured when the release ramp began
    release_from: f64,
    handle: TickHandle,
}

impl<V: Voice> EnvelopeRun<V> {
    /// Starts an envelope over `voice`.
    ///
    /// Plays the voice at volume 0, registers a tick subscription, and
    /// enters `Attack`. Zero-length phases are skipped outright, so a
    /// fully zero spec completes (and stops the voice) before the first
    /// tick; callers should check [`is_done`](Self::is_done) after
    /// construction.
    pub fn new(mut voice: V, spec: EnvelopeSpec, peak: f64, scheduler: &mut TickScheduler) -> Self {
        voice.set_volume(0.0);
        voice.play();

        let mut run = Self {
            voice: Some(voice),
            spec,
            peak: peak.clamp(0.0, 1.0),
            phase: EnvelopePhase::Attack,
            level: 0.0,
            phase_ticks: 0,
            attack_ticks: scheduler.ticks_for(spec.attack_ms),
            hold_ticks: scheduler.ticks_for(spec.hold_ms),
            release_ticks: scheduler.ticks_for(spec.release_ms),
            release_from: 0.0,
            handle: scheduler.schedule_repeating(),
        };

        if run.attack_ticks == 0 {
            run.set_level(run.peak);
            run.enter_hold();
        }
        run
    }

    /// Advances the envelope by one scheduler tick and returns the
    /// resulting phase. Ticking a `Done` run is a no-op.
    pub fn tick(&mut self) -> EnvelopePhase {
        match self.phase {
            EnvelopePhase::Attack => {
                self.phase_ticks += 1;
                if self.phase_ticks >= self.attack_ticks {
                    self.set_level(self.peak);
                    self.enter_hold();
                } else {
                    let progress = f64::from(self.phase_ticks) / f64::from(self.attack_ticks);
                    self.set_level(self.peak * self.spec.attack_curve.apply(progress));
                }
            }
            EnvelopePhase::Hold => {
                self.phase_ticks += 1;
                if self.phase_ticks >= self.hold_ticks {
                    self.enter_release();
                }
            }
            EnvelopePhase::Release => {
                self.phase_ticks += 1;
                if self.phase_ticks >= self.release_ticks {
                    self.finish();
                } else {
                    let progress = f64::from(self.phase_ticks) / f64::from(self.release_ticks);
                    let shape = 1.0 - self.spec.release_curve.apply(progress);
                    self.set_level(self.release_from * shape);
                }
            }
            EnvelopePhase::Done => {}
        }
        self.phase
    }

    /// Forces the run to `Done` immediately: level to 0, voice stopped.
    ///
    /// Idempotent; the voice is still stopped only once. The driver must
    /// cancel this run's handle on the scheduler as with natural
    /// completion.
    pub fn cancel(&mut self) {
        self.finish();
    }

    /// Current phase.
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Current level in `[0, peak]`.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Effective peak volume for this run.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// The run's tick subscription handle.
    pub fn handle(&self) -> TickHandle {
        self.handle
    }

    /// True once the run has reached `Done`.
    pub fn is_done(&self) -> bool {
        self.phase == EnvelopePhase::Done
    }

    fn enter_hold(&mut self) {
        self.phase = EnvelopePhase::Hold;
        self.phase_ticks = 0;
        if self.hold_ticks == 0 {
            self.enter_release();
        }
    }

    fn enter_release(&mut self) {
        self.phase = EnvelopePhase::Release;
        self.phase_ticks = 0;
        self.release_from = self.level;
        if self.release_ticks == 0 {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.level = 0.0;
        if let Some(mut voice) = self.voice.take() {
            voice.set_volume(0.0);
            voice.stop();
        }
        self.phase = EnvelopePhase::Done;
    }

    fn set_level(&mut self, level: f64) {
        self.level = level.clamp(0.0, self.peak);
        if let Some(voice) = self.voice.as_mut() {
            voice.set_volume(self.level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct ProbeState {
        plays: u32,
        stops: u32,
        volumes: Vec<f64>,
    }

    #[derive(Clone, Default)]
    struct Probe(Rc<RefCell<ProbeState>>);

    struct MockVoice {
        probe: Probe,
        volume: f64,
    }

    impl MockVoice {
        fn new(probe: &Probe) -> Self {
            Self {
                probe: probe.clone(),
                volume: 0.0,
            }
        }
    }

    impl Voice for MockVoice {
        fn play(&mut self) {
            self.probe.0.borrow_mut().plays += 1;
        }

        fn stop(&mut self) {
            self.probe.0.borrow_mut().stops += 1;
        }

        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
            self.probe.0.borrow_mut().volumes.push(volume);
        }

        fn volume(&self) -> f64 {
            self.volume
        }
    }

    fn spec(peak: f64, attack_ms: u32, hold_ms: u32, release_ms: u32) -> EnvelopeSpec {
        EnvelopeSpec::new(peak, attack_ms, hold_ms, release_ms)
    }

    #[test]
    fn test_starts_in_attack_at_zero() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 40, 30, 20),
            0.5,
            &mut scheduler,
        );

        assert_eq!(run.phase(), EnvelopePhase::Attack);
        assert_eq!(run.level(), 0.0);
        assert_eq!(probe.0.borrow().plays, 1);
        assert!(scheduler.is_live(run.handle()));
    }

    #[test]
    fn test_attack_ramps_monotonically_to_peak() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(1.0, 100, 50, 20),
            0.8,
            &mut scheduler,
        );

        let mut last = 0.0;
        for _ in 0..9 {
            run.tick();
            assert!(run.level() >= last);
            last = run.level();
        }
        run.tick();
        assert_eq!(run.level(), 0.8);
        assert_eq!(run.phase(), EnvelopePhase::Hold);
    }

    #[test]
    fn test_hold_keeps_level_constant() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 10, 50, 20),
            0.5,
            &mut scheduler,
        );

        run.tick();
        assert_eq!(run.phase(), EnvelopePhase::Hold);
        for _ in 0..4 {
            run.tick();
            assert_eq!(run.phase(), EnvelopePhase::Hold);
            assert_eq!(run.level(), 0.5);
        }
    }

    #[test]
    fn test_release_reaches_done_and_stops_once() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 10, 10, 30),
            0.5,
            &mut scheduler,
        );

        let mut ticks = 0;
        while !run.is_done() {
            run.tick();
            ticks += 1;
            assert!(ticks < 100, "envelope did not terminate");
        }

        assert_eq!(run.level(), 0.0);
        assert_eq!(probe.0.borrow().stops, 1);
        // Attack 1 + hold 1 + release 3 ticks.
        assert_eq!(ticks, 5);
    }

    #[test]
    fn test_level_never_exceeds_peak_nor_goes_negative() {
        for (attack, hold, release) in [(40, 180, 70), (20, 30, 20), (60, 400, 80), (0, 60, 30)] {
            let probe = Probe::default();
            let mut scheduler = TickScheduler::new(10);
            let mut run = EnvelopeRun::new(
                MockVoice::new(&probe),
                spec(0.3, attack, hold, release),
                0.3,
                &mut scheduler,
            );
            while !run.is_done() {
                run.tick();
            }
            let state = probe.0.borrow();
            assert!(state.volumes.iter().all(|v| (0.0..=0.3).contains(v)));
        }
    }

    #[test]
    fn test_zero_attack_jumps_to_peak() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 0, 50, 20),
            0.5,
            &mut scheduler,
        );

        assert_eq!(run.phase(), EnvelopePhase::Hold);
        assert_eq!(run.level(), 0.5);
    }

    #[test]
    fn test_all_zero_spec_completes_immediately() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 0, 0, 0),
            0.5,
            &mut scheduler,
        );

        assert!(run.is_done());
        assert_eq!(probe.0.borrow().stops, 1);
    }

    #[test]
    fn test_cancel_stops_exactly_once() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 100, 100, 100),
            0.5,
            &mut scheduler,
        );

        run.tick();
        run.cancel();
        assert!(run.is_done());
        assert_eq!(run.level(), 0.0);

        run.cancel();
        run.tick();
        assert_eq!(probe.0.borrow().stops, 1);
    }

    #[test]
    fn test_tick_after_done_is_noop() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.5, 0, 0, 0),
            0.5,
            &mut scheduler,
        );

        assert_eq!(run.tick(), EnvelopePhase::Done);
        assert_eq!(run.tick(), EnvelopePhase::Done);
        assert_eq!(probe.0.borrow().stops, 1);
    }

    #[test]
    fn test_duration_is_bounded_by_spec() {
        let probe = Probe::default();
        let mut scheduler = TickScheduler::new(10);
        let mut run = EnvelopeRun::new(
            MockVoice::new(&probe),
            spec(0.2, 25, 60, 30),
            0.2,
            &mut scheduler,
        );

        let mut ticks = 0;
        while !run.is_done() {
            run.tick();
            ticks += 1;
        }
        // ceil(25/10) + ceil(60/10) + ceil(30/10) = 3 + 6 + 3
        assert_eq!(ticks, 12);
    }
}
