//! End-to-end lifecycle tests over the reference synth backend.

#![cfg(feature = "synth")]

use std::time::Duration;

use chime::{Cue, CueEngine, EngineConfig, Signal, SynthFactory};

fn engine_with_mixer() -> (CueEngine<SynthFactory>, chime::SynthMixer) {
    let factory = SynthFactory::new(44_100.0);
    let mixer = factory.mixer();
    (CueEngine::new(factory), mixer)
}

fn drain(mixer: &mut chime::SynthMixer, samples: usize) -> f64 {
    (0..samples)
        .map(|_| mixer.next_sample().abs())
        .fold(0.0, f64::max)
}

#[test]
fn click_plays_once_and_cleans_up() {
    let (mut engine, mut mixer) = engine_with_mixer();
    engine.configure(true, 0.2);

    engine.trigger(Cue::Click);
    assert_eq!(engine.active_cue_count(), 1);
    assert_eq!(mixer.active_voice_count(), 1);

    // Half-way through the envelope the cue is audible.
    engine.advance(Duration::from_millis(60));
    let loudest = drain(&mut mixer, 2_000);
    assert!(loudest > 0.0);

    // Past the envelope everything is gone: run reaped, handle cancelled,
    // voice dropped from the mixer pool.
    engine.advance(Duration::from_millis(100));
    assert!(engine.is_idle());
    assert_eq!(engine.live_tick_handles(), 0);
    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn every_cue_in_the_palette_terminates() {
    let (mut engine, mut mixer) = engine_with_mixer();

    for cue in Cue::ALL {
        engine.trigger(cue);
    }
    assert_eq!(engine.active_cue_count(), Cue::ALL.len());

    // Confetti is the longest cue at 540ms.
    engine.advance(Duration::from_secs(1));
    assert!(engine.is_idle());
    assert_eq!(engine.live_tick_handles(), 0);
    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn ambient_restart_never_doubles_the_bed() {
    let (mut engine, mut mixer) = engine_with_mixer();

    engine.start_ambient();
    engine.advance(Duration::from_millis(200));
    engine.start_ambient();

    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 1);
    assert!(engine.ambient_active());
}

#[test]
fn ambient_full_session_winds_down_clean() {
    let (mut engine, mut mixer) = engine_with_mixer();

    engine.start_ambient();
    engine.advance(Duration::from_secs(1));
    assert!(engine.ambient_active());
    assert_eq!(engine.live_tick_handles(), 0); // steady: no fade scheduled

    engine.modulate_ambient(80.0, 20.0, 100.0, 100.0);
    let loudest = drain(&mut mixer, 4_410);
    assert!(loudest > 0.0);

    engine.stop_ambient();
    engine.stop_ambient(); // re-entrant stop collapses
    engine.advance(Duration::from_secs(1));

    assert!(engine.is_idle());
    assert_eq!(engine.live_tick_handles(), 0);
    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn stop_during_fade_in_leaves_no_stray_timer() {
    let (mut engine, mut mixer) = engine_with_mixer();

    engine.start_ambient();
    engine.advance(Duration::from_millis(100)); // mid fade-in
    engine.stop_ambient();

    // Exactly one ramp (the fade-out) may be live; the fade-in is gone.
    assert_eq!(engine.live_tick_handles(), 1);

    engine.advance(Duration::from_secs(1));
    assert!(engine.is_idle());
    assert_eq!(engine.live_tick_handles(), 0);
    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn named_triggers_drive_the_same_palette() {
    let (mut engine, _mixer) = engine_with_mixer();

    for cue in Cue::ALL {
        engine.trigger_named(cue.name());
    }
    assert_eq!(engine.active_cue_count(), Cue::ALL.len());
}

#[test]
fn a_busy_session_leaks_nothing() {
    let (mut engine, mut mixer) = engine_with_mixer();

    for round in 0..10 {
        engine.trigger(Cue::Hover);
        engine.trigger(Cue::Click);
        engine.start_ambient();
        engine.advance(Duration::from_millis(50));
        engine.modulate_ambient(f64::from(round) * 10.0, 50.0, 100.0, 100.0);
        if round % 2 == 0 {
            engine.stop_ambient();
        }
        engine.advance(Duration::from_millis(75));
    }
    engine.stop_all();

    assert!(engine.is_idle());
    assert_eq!(engine.live_tick_handles(), 0);
    mixer.next_sample();
    assert_eq!(mixer.voice_count(), 0);
}

#[test]
fn disabling_mid_session_quiets_new_cues_only() {
    let (mut engine, _mixer) = engine_with_mixer();

    engine.trigger(Cue::Whoosh);
    engine.set_enabled(false);
    engine.trigger(Cue::Whoosh);

    // The in-flight cue keeps playing; the new one never started.
    assert_eq!(engine.active_cue_count(), 1);

    engine.advance(Duration::from_secs(1));
    assert!(engine.is_idle());
}
