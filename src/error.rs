//! Error types for sound intake and MIDI access.

use thiserror::Error;

/// Errors that can occur while turning a user file into a playable sound.
#[derive(Debug, Error)]
pub enum SoundLoadError {
    /// The file's type is not `audio/*`; rejected before any decoding.
    #[error("not an audio file: {path} ({mime})")]
    UnsupportedFileType { path: String, mime: String },

    /// Failed to open or read the file.
    #[error("failed to open file: {0}")]
    Io(#[from] std::io::Error),

    /// The WAV reader rejected the file.
    #[error("failed to decode WAV file: {0}")]
    Wav(#[from] hound::Error),

    /// Symphonia could not probe or decode the file.
    #[error("failed to decode audio file: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// Audio file has no default track.
    #[error("audio file has no default track")]
    NoDefaultTrack,

    /// Audio file is missing sample rate information.
    #[error("audio file is missing a sample rate")]
    MissingSampleRate,

    /// Audio file is missing channel information.
    #[error("audio file is missing channel information")]
    MissingChannels,

    /// Decoding succeeded but produced no frames.
    #[error("audio file contains no samples")]
    Empty,
}

/// Errors from MIDI device access.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The platform refused or lacks MIDI input support.
    #[error("MIDI unavailable: {0}")]
    Unavailable(String),

    /// The requested device is no longer attached.
    #[error("MIDI device not found: {0}")]
    UnknownPort(String),

    /// Opening the device failed.
    #[error("could not connect to {port}: {reason}")]
    Connect { port: String, reason: String },
}
