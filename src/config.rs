//! Engine configuration and capacity constants

use serde::{Deserialize, Serialize};

/// Number of oscillator layers a tone can stack.
pub const MAX_TONE_LAYERS: usize = 4;

/// Polyphony: number of voice slots the engine keeps.
pub const MAX_VOICES: usize = 12;

/// Per-voice sample ring capacity (power of two).
pub const VOICE_RING_SIZE: usize = 8192;
/// A voice producer tops its ring up once the fill ratio drops to this.
pub const VOICE_REFILL_THRESHOLD: f64 = 0.5;
/// Samples a voice producer generates at most per wake-up.
pub const VOICE_REFILL_CHUNK: usize = 8192;

/// Mix ring capacity in samples; stereo pairs, so half as many frames.
pub const MIX_RING_SIZE: usize = 1024;
pub const MIX_REFILL_THRESHOLD: f64 = 0.5;
pub const MIX_REFILL_CHUNK: usize = 1024;

/// Pedal-chain output ring capacity in samples.
pub const PEDAL_RING_SIZE: usize = 1024;
pub const PEDAL_REFILL_CHUNK: usize = 1024;

/// Size of the recent-output window kept for visualization (power of two).
pub const RECENT_SAMPLE_SIZE: usize = 1024;

/// Supported sample-rate range in Hz.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;
pub const MAX_SAMPLE_RATE: f64 = 192_000.0;

/// Audio output configuration.
///
/// Channel count is fixed at 2 for now; anything else is rejected at
/// engine construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: f64,
    pub channels: u16,
    /// Preferred frames per device callback.
    pub buffer_size: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            buffer_size: 512,
        }
    }
}

impl AudioConfig {
    /// Seconds between successive samples at this rate.
    pub fn delta_time(&self) -> f64 {
        1.0 / self.sample_rate
    }
}
