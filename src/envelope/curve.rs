//! Interpolation curves for envelope segments.

/// Shape of an envelope segment's transition.
///
/// A curve maps normalized segment progress [0, 1] to a normalized level
/// [0, 1]. The default is [`Linear`](Curve::Linear), which reproduces
/// fixed per-tick volume increments; the other shapes soften or sharpen
/// the attack and release of a cue without changing its duration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Curve {
    /// Constant rate of change
    #[default]
    Linear,

    /// Slow start, fast finish. The parameter is the exponent
    /// (`2.0` = squared, `3.0` = cubed).
    Exponential(f64),

    /// Fast start, slow finish; inverse of [`Exponential`](Curve::Exponential).
    Logarithmic(f64),

    /// Smoothstep ease-in/ease-out
    SCurve,
}

impl Curve {
    /// Applies the curve to normalized progress.
    ///
    /// Input is clamped to [0, 1]; every shape is monotone non-decreasing,
    /// which keeps envelope levels monotone within a phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use chime::Curve;
    ///
    /// assert_eq!(Curve::Linear.apply(0.5), 0.5);
    /// assert_eq!(Curve::Exponential(2.0).apply(0.5), 0.25);
    /// ```
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::Exponential(exp) => t.powf(*exp),
            Curve::Logarithmic(exp) => 1.0 - (1.0 - t).powf(*exp),
            Curve::SCurve => t * t * (3.0 - 2.0 * t),
        }
    }
}
