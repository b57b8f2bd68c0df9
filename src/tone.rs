//! Timbre descriptions: oscillator layers, filter and envelope settings

use serde::{Deserialize, Serialize};

use crate::config::MAX_TONE_LAYERS;

/// Waveform of a single oscillator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveKind {
    /// Terminates the layer list of a tone.
    None,
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Noise,
}

/// Biquad filter response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
    Notch,
    /// Bypass: samples pass through untouched.
    None,
}

/// Filter settings of a tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCfg {
    pub kind: FilterKind,
    pub cutoff_hz: f64,
    pub resonance: f64,
}

impl FilterCfg {
    pub const NONE: FilterCfg = FilterCfg {
        kind: FilterKind::None,
        cutoff_hz: 0.0,
        resonance: 1.0,
    };
}

/// ADSR envelope settings, all times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeCfg {
    pub attack_s: f64,
    pub decay_s: f64,
    /// Level held during sustain, in [0, 1].
    pub sustain_level: f64,
    pub release_s: f64,
}

/// One oscillator layer of a tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneLayer {
    pub wave: WaveKind,
    /// Pitch offset in semitones relative to the played note.
    pub detune: f64,
    /// Linear gain this layer contributes to the mix.
    pub mix: f64,
    /// Constant phase offset added when sampling the waveform.
    pub phase_offset: f64,
}

impl ToneLayer {
    /// Unused slot; iteration over a tone's layers stops here.
    pub const SILENT: ToneLayer = ToneLayer {
        wave: WaveKind::None,
        detune: 0.0,
        mix: 0.0,
        phase_offset: 0.0,
    };
}

/// A complete timbre: up to four oscillator layers followed by a filter
/// and an amplitude envelope. The layer list ends at the first
/// `WaveKind::None` entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub layers: [ToneLayer; MAX_TONE_LAYERS],
    pub filter: FilterCfg,
    pub envelope: EnvelopeCfg,
}

impl Tone {
    /// The layers in play, up to the first `None` terminator.
    pub fn active_layers(&self) -> &[ToneLayer] {
        let end = self
            .layers
            .iter()
            .position(|layer| layer.wave == WaveKind::None)
            .unwrap_or(MAX_TONE_LAYERS);
        &self.layers[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(wave: WaveKind) -> ToneLayer {
        ToneLayer {
            wave,
            detune: 0.0,
            mix: 1.0,
            phase_offset: 0.0,
        }
    }

    #[test]
    fn test_active_layers_stop_at_none() {
        let tone = Tone {
            layers: [
                layer(WaveKind::Sine),
                layer(WaveKind::Square),
                ToneLayer::SILENT,
                layer(WaveKind::Triangle),
            ],
            filter: FilterCfg::NONE,
            envelope: EnvelopeCfg {
                attack_s: 0.0,
                decay_s: 0.0,
                sustain_level: 1.0,
                release_s: 0.0,
            },
        };
        assert_eq!(tone.active_layers().len(), 2);
    }

    #[test]
    fn test_full_tone_has_four_layers() {
        let tone = Tone {
            layers: [layer(WaveKind::Sine); MAX_TONE_LAYERS],
            filter: FilterCfg::NONE,
            envelope: EnvelopeCfg {
                attack_s: 0.0,
                decay_s: 0.0,
                sustain_level: 1.0,
                release_s: 0.0,
            },
        };
        assert_eq!(tone.active_layers().len(), MAX_TONE_LAYERS);
    }
}
