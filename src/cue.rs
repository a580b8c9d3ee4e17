//! Named cues and the registry mapping them to voice/envelope specs.

use std::collections::HashMap;

use crate::envelope::EnvelopeSpec;
use crate::voice::{TremoloSpec, VoiceKind, VoiceSpec, Waveform};

/// The fixed set of UI cues the engine knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A check passed or an action completed
    Success,
    /// A card or panel scrolled into view
    CardReveal,
    /// Pointer entered an interactive element
    Hover,
    /// An element was activated
    Click,
    /// Celebration burst
    Confetti,
    /// A section swept past
    Whoosh,
    /// Something needs attention
    Warning,
    /// A compliance check resolved
    Compliance,
    /// Navigated between sections
    Navigation,
    /// An accordion item opened
    Expand,
    /// An accordion item closed
    Collapse,
}

impl Cue {
    /// Every cue, in registry order.
    pub const ALL: [Cue; 11] = [
        Cue::Success,
        Cue::CardReveal,
        Cue::Hover,
        Cue::Click,
        Cue::Confetti,
        Cue::Whoosh,
        Cue::Warning,
        Cue::Compliance,
        Cue::Navigation,
        Cue::Expand,
        Cue::Collapse,
    ];

    /// The cue's snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Cue::Success => "success",
            Cue::CardReveal => "card_reveal",
            Cue::Hover => "hover",
            Cue::Click => "click",
            Cue::Confetti => "confetti",
            Cue::Whoosh => "whoosh",
            Cue::Warning => "warning",
            Cue::Compliance => "compliance",
            Cue::Navigation => "navigation",
            Cue::Expand => "expand",
            Cue::Collapse => "collapse",
        }
    }

    /// Parses a snake_case cue name.
    ///
    /// # Examples
    ///
    /// ```
    /// use chime::Cue;
    ///
    /// assert_eq!(Cue::from_name("card_reveal"), Some(Cue::CardReveal));
    /// assert_eq!(Cue::from_name("drumroll"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Cue> {
        Cue::ALL.into_iter().find(|cue| cue.name() == name)
    }
}

/// Voice and envelope configuration for one cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueSpec {
    /// Sound source for the cue's voice
    pub kind: VoiceKind,
    /// Center frequency (oscillator voices) or noise cutoff in Hz
    pub frequency: f64,
    /// Optional amplitude wobble on the voice
    pub tremolo: Option<TremoloSpec>,
    /// Amplitude envelope
    pub envelope: EnvelopeSpec,
}

impl CueSpec {
    /// A low-passed noise cue with the default tremolo, the palette every
    /// built-in cue uses.
    pub fn noise(cutoff: f64, envelope: EnvelopeSpec) -> Self {
        Self {
            kind: VoiceKind::Noise,
            frequency: cutoff,
            tremolo: Some(TremoloSpec::default()),
            envelope,
        }
    }

    /// A pitched oscillator cue, no tremolo.
    pub fn wave(waveform: Waveform, frequency: f64, envelope: EnvelopeSpec) -> Self {
        Self {
            kind: VoiceKind::Wave(waveform),
            frequency,
            tremolo: None,
            envelope,
        }
    }

    /// Replaces the tremolo setting.
    pub fn with_tremolo(mut self, tremolo: Option<TremoloSpec>) -> Self {
        self.tremolo = tremolo;
        self
    }

    /// The [`VoiceSpec`] a factory needs to build this cue's voice.
    pub fn voice_spec(&self) -> VoiceSpec {
        VoiceSpec {
            kind: self.kind,
            frequency: self.frequency,
            tremolo: self.tremolo,
        }
    }
}

/// Read-only mapping from [`Cue`] to [`CueSpec`].
///
/// Built once (default table or builder) and never mutated afterwards; the
/// engine only reads from it. The default table is the tuned palette of
/// soft noise bursts; the exact numbers are tunable configuration, not
/// contract.
///
/// # Examples
///
/// ```
/// use chime::{Cue, CueRegistry, CueSpec, EnvelopeSpec, Waveform};
///
/// // Default palette, with a custom pitched chime for Success.
/// let registry = CueRegistry::default().with_spec(
///     Cue::Success,
///     CueSpec::wave(Waveform::Sine, 880.0, EnvelopeSpec::new(0.3, 40, 180, 70)),
/// );
/// assert_eq!(registry.len(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct CueRegistry {
    specs: HashMap<Cue, CueSpec>,
}

impl CueRegistry {
    /// An empty registry, for building a fully custom palette.
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Adds or replaces the spec for a cue.
    pub fn with_spec(mut self, cue: Cue, spec: CueSpec) -> Self {
        self.specs.insert(cue, spec);
        self
    }

    /// Looks up the spec for a cue.
    pub fn get(&self, cue: Cue) -> Option<&CueSpec> {
        self.specs.get(&cue)
    }

    /// Number of registered cues.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when no cues are registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for CueRegistry {
    /// The built-in palette: low-passed noise bursts, brighter cutoffs for
    /// lighter interactions, longer holds for celebratory ones.
    fn default() -> Self {
        let table: [(Cue, f64, f64, u32, u32, u32); 11] = [
            (Cue::Success, 900.0, 0.30, 40, 180, 70),
            (Cue::CardReveal, 1100.0, 0.20, 50, 100, 40),
            (Cue::Hover, 1400.0, 0.10, 20, 30, 20),
            (Cue::Click, 800.0, 0.15, 25, 60, 30),
            (Cue::Confetti, 1600.0, 0.25, 60, 400, 80),
            (Cue::Whoosh, 700.0, 0.20, 35, 100, 50),
            (Cue::Warning, 500.0, 0.18, 40, 120, 60),
            (Cue::Compliance, 1300.0, 0.20, 30, 150, 70),
            (Cue::Navigation, 1000.0, 0.15, 20, 80, 40),
            (Cue::Expand, 1200.0, 0.18, 25, 100, 55),
            (Cue::Collapse, 600.0, 0.12, 15, 60, 30),
        ];

        let specs = table
            .into_iter()
            .map(|(cue, cutoff, peak, attack, hold, release)| {
                let envelope = EnvelopeSpec::new(peak, attack, hold, release);
                (cue, CueSpec::noise(cutoff, envelope))
            })
            .collect();

        Self { specs }
    }
}
