//! Immutable envelope configuration.

use super::Curve;

/// Amplitude-envelope parameters for one cue invocation.
///
/// A spec is immutable once built; triggering a cue snapshots it into an
/// [`EnvelopeRun`](super::EnvelopeRun), so reconfiguring the engine never
/// disturbs envelopes already in flight.
///
/// `peak` is a factor in [0, 1] that scales the engine's master volume;
/// the times are wall-clock milliseconds.
///
/// # Examples
///
/// ```
/// use chime::{Curve, EnvelopeSpec};
///
/// // A short click: 25ms up, 60ms at peak, 30ms down.
/// let spec = EnvelopeSpec::new(0.15, 25, 60, 30)
///     .with_release_curve(Curve::Exponential(2.0));
/// assert_eq!(spec.total_ms(), 115);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSpec {
    /// Peak volume factor (0.0 to 1.0), applied on top of master volume
    pub peak: f64,
    /// Attack time in milliseconds
    pub attack_ms: u32,
    /// Hold time at peak in milliseconds
    pub hold_ms: u32,
    /// Release time in milliseconds
    pub release_ms: u32,
    /// Shape of the attack ramp
    pub attack_curve: Curve,
    /// Shape of the release ramp
    pub release_curve: Curve,
}

impl EnvelopeSpec {
    /// Creates a spec with linear ramps. `peak` is clamped to [0, 1].
    pub fn new(peak: f64, attack_ms: u32, hold_ms: u32, release_ms: u32) -> Self {
        Self {
            peak: peak.clamp(0.0, 1.0),
            attack_ms,
            hold_ms,
            release_ms,
            attack_curve: Curve::Linear,
            release_curve: Curve::Linear,
        }
    }

    /// Sets the attack curve.
    pub fn with_attack_curve(mut self, curve: Curve) -> Self {
        self.attack_curve = curve;
        self
    }

    /// Sets the release curve.
    pub fn with_release_curve(mut self, curve: Curve) -> Self {
        self.release_curve = curve;
        self
    }

    /// Total envelope duration in milliseconds.
    ///
    /// Every run terminates within this bound (rounded up to whole ticks).
    pub fn total_ms(&self) -> u32 {
        self.attack_ms + self.hold_ms + self.release_ms
    }
}
