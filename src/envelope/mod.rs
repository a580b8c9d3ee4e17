//! Amplitude envelopes: specs, interpolation curves, and the tick-driven
//! run state machine.

mod curve;
mod run;
mod spec;

pub use curve::Curve;
pub use run::{EnvelopePhase, EnvelopeRun};
pub use spec::EnvelopeSpec;
