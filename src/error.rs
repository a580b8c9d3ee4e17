//! Error types for the cue engine.
//!
//! The engine never propagates errors to UI callers; everything here is
//! absorbed at the public surface and logged. Internal fallible paths use
//! [`Result`] so the absorption point is explicit.

use thiserror::Error;

/// Result alias used by fallible engine internals.
pub type Result<T> = std::result::Result<T, CueError>;

/// Failures the engine absorbs and logs rather than propagating.
#[derive(Debug, Error)]
pub enum CueError {
    /// The audio backend is missing. The engine degrades to disabled for
    /// the rest of the session and logs once.
    #[error("audio backend unavailable")]
    BackendUnavailable,

    /// A cue name outside the registry was requested. Programmer error:
    /// asserts in development builds, degrades to a logged no-op otherwise.
    #[error("unknown cue: {0}")]
    UnknownCue(String),

    /// The backend failed while allocating a voice. The triggering call is
    /// dropped but the engine stays enabled.
    #[error("voice creation failed")]
    VoiceCreationFailed(#[source] VoiceError),
}

/// Errors reported by a [`VoiceFactory`](crate::VoiceFactory).
#[derive(Debug, Error)]
pub enum VoiceError {
    /// No audio output capability exists at all.
    #[error("audio backend unavailable")]
    Unavailable,

    /// The backend rejected this particular voice allocation.
    #[error("voice allocation failed: {0}")]
    Allocation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CueError::UnknownCue("fanfare".to_string());
        assert_eq!(err.to_string(), "unknown cue: fanfare");

        let err = VoiceError::Allocation("out of channels".to_string());
        assert_eq!(err.to_string(), "voice allocation failed: out of channels");
    }

    #[test]
    fn test_creation_failure_carries_source() {
        use std::error::Error;

        let err = CueError::VoiceCreationFailed(VoiceError::Allocation("busy".to_string()));
        assert!(err.source().is_some());
    }
}
