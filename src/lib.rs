//! waveforge: a real-time polyphonic software synthesizer
//!
//! Turns note events into a continuous 16-bit stereo PCM stream:
//! - Multi-layer oscillator tones with biquad filtering and ADSR envelopes
//! - Polyphonic voice allocation with per-voice producer threads
//! - A reorderable chain of stereo effect pedals (reverb, overdrive,
//!   phaser)
//! - Lock-free SPSC rings between every pipeline stage and a
//!   non-blocking device callback via cpal
//!
//! ```no_run
//! use waveforge::{AudioConfig, ControlMode, InstrumentKind, NoteCfg, Synthesizer};
//!
//! let mut synth = Synthesizer::new(AudioConfig::default())?;
//! synth.start()?;
//! let voice = synth.play_note(
//!     InstrumentKind::BellLead,
//!     ControlMode::Manual,
//!     &NoteCfg::new(69),
//! )?;
//! std::thread::sleep(std::time::Duration::from_millis(500));
//! synth.end_note(voice);
//! synth.stop();
//! # Ok::<(), waveforge::SynthError>(())
//! ```

pub mod config;
pub mod device;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod instruments;
pub mod note;
pub mod pedal;
pub mod ring;
pub mod tone;

mod voice;

pub use config::AudioConfig;
pub use device::DeviceState;
pub use engine::{SynthStats, Synthesizer};
pub use error::{error_description, last_error, ErrorKind, SynthError};
pub use instruments::{InstrumentInfo, InstrumentKind};
pub use note::{ControlMode, NoteCfg};
pub use pedal::{PedalInfo, PedalKind};
pub use tone::{EnvelopeCfg, FilterCfg, FilterKind, Tone, ToneLayer, WaveKind};
