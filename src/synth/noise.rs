//! White noise source.

use rand::Rng;

use crate::signal::Signal;

/// A white noise generator.
///
/// Each sample is drawn uniformly from [-1.0, 1.0]. Generic over the RNG
/// so tests and the mixer can use a seedable, `Send` generator.
pub struct WhiteNoise<R: Rng = rand::rngs::ThreadRng> {
    rng: R,
}

impl WhiteNoise<rand::rngs::ThreadRng> {
    /// Creates a generator backed by the thread-local RNG.
    ///
    /// # Examples
    ///
    /// ```
    /// use chime::Signal;
    /// use chime::synth::WhiteNoise;
    ///
    /// let mut noise = WhiteNoise::new();
    /// let sample = noise.next_sample();
    /// assert!((-1.0..=1.0).contains(&sample));
    /// ```
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for WhiteNoise<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WhiteNoise<R> {
    /// Creates a generator with a custom RNG.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use chime::Signal;
    /// use chime::synth::WhiteNoise;
    ///
    /// let rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let mut noise = WhiteNoise::with_rng(rng);
    /// let _ = noise.next_sample();
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Signal for WhiteNoise<R> {
    fn next_sample(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}
