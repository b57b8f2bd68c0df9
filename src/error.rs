//! Error taxonomy for fallible engine operations
//!
//! Every fallible public operation returns a typed `Result`; in addition
//! the kind of the most recent error is recorded in a process-wide slot so
//! callers polling telemetry can surface it without threading results
//! around.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Error kinds surfaced by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// A required allocation failed.
    MemAlloc,
    /// The underlying audio device rejected an operation.
    Device(String),
    /// Invalid note parameters (MIDI range, unknown instrument).
    NoteCfg,
    /// Operation invoked on a controller that has been cleaned up.
    Uninit,
    /// All voice slots are busy; the caller may retry later.
    VoiceUnavailable,
    /// Invalid static configuration (sample rate, channels, ring sizes).
    Config(String),
    /// Failed to spawn a worker thread.
    Worker(String),
    /// The call exercises a feature this build does not support.
    Unsupport,
}

impl SynthError {
    /// Stable discriminant used for the process-wide last-error slot.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthError::MemAlloc => ErrorKind::MemAlloc,
            SynthError::Device(_) => ErrorKind::Device,
            SynthError::NoteCfg => ErrorKind::NoteCfg,
            SynthError::Uninit => ErrorKind::Uninit,
            SynthError::VoiceUnavailable => ErrorKind::VoiceUnavailable,
            SynthError::Config(_) => ErrorKind::Config,
            SynthError::Worker(_) => ErrorKind::Worker,
            SynthError::Unsupport => ErrorKind::Unsupport,
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::MemAlloc => write!(f, "failed to allocate memory"),
            SynthError::Device(msg) => write!(f, "audio device error: {}", msg),
            SynthError::NoteCfg => write!(f, "wrong note configuration"),
            SynthError::Uninit => write!(f, "synthesizer not initialized"),
            SynthError::VoiceUnavailable => write!(f, "all voice slots are in use"),
            SynthError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SynthError::Worker(msg) => write!(f, "failed to start worker: {}", msg),
            SynthError::Unsupport => write!(f, "unsupported operation"),
        }
    }
}

impl std::error::Error for SynthError {}

/// Payload-free error kind, readable from the process-wide slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ErrorKind {
    None = 0,
    MemAlloc = 1,
    Device = 2,
    NoteCfg = 3,
    Uninit = 4,
    VoiceUnavailable = 5,
    Config = 6,
    Worker = 7,
    Unsupport = 8,
}

impl ErrorKind {
    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            1 => ErrorKind::MemAlloc,
            2 => ErrorKind::Device,
            3 => ErrorKind::NoteCfg,
            4 => ErrorKind::Uninit,
            5 => ErrorKind::VoiceUnavailable,
            6 => ErrorKind::Config,
            7 => ErrorKind::Worker,
            8 => ErrorKind::Unsupport,
            _ => ErrorKind::None,
        }
    }
}

static LAST_ERROR: AtomicU8 = AtomicU8::new(ErrorKind::None as u8);

/// Record an error in the process-wide slot and pass it through, so call
/// sites can `return Err(record(...))`.
pub(crate) fn record(err: SynthError) -> SynthError {
    LAST_ERROR.store(err.kind() as u8, Ordering::Relaxed);
    err
}

/// Kind of the most recent error recorded anywhere in the process, or
/// `ErrorKind::None` if nothing has failed yet.
pub fn last_error() -> ErrorKind {
    ErrorKind::from_code(LAST_ERROR.load(Ordering::Relaxed))
}

/// Human-readable description of an error kind.
pub fn error_description(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::None => "no error",
        ErrorKind::MemAlloc => "failed to allocate memory",
        ErrorKind::Device => "audio device error",
        ErrorKind::NoteCfg => "wrong note configuration",
        ErrorKind::Uninit => "synthesizer not initialized",
        ErrorKind::VoiceUnavailable => "all voice slots are in use",
        ErrorKind::Config => "invalid configuration",
        ErrorKind::Worker => "failed to start worker",
        ErrorKind::Unsupport => "unsupported operation",
    }
}
