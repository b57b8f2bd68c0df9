//! Built-in instrument catalogue
//!
//! Static table of tone signatures plus display metadata. The numeric
//! vectors are load-bearing: tests and downstream captures expect identical
//! audio for identical notes, so treat any edit here as a sound change.

use serde::{Deserialize, Serialize};

use crate::tone::{EnvelopeCfg, FilterCfg, FilterKind, Tone, ToneLayer, WaveKind};

/// Built-in instruments, indexable in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    LeadSquare,
    WarmBass,
    EtherealPad,
    MetallicPluck,
    WobbleBass,
    BellLead,
    DeepDrone,
}

impl InstrumentKind {
    pub const COUNT: usize = 7;

    pub const ALL: [InstrumentKind; Self::COUNT] = [
        InstrumentKind::LeadSquare,
        InstrumentKind::WarmBass,
        InstrumentKind::EtherealPad,
        InstrumentKind::MetallicPluck,
        InstrumentKind::WobbleBass,
        InstrumentKind::BellLead,
        InstrumentKind::DeepDrone,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A catalogue entry: the tone plus display metadata.
#[derive(Debug)]
pub struct InstrumentSignature {
    pub tone: Tone,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// Display metadata of an instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub name: String,
    pub category: String,
    pub description: String,
}

// Envelope presets shared by the catalogue entries.

/// Fast attack, quick decay, little sustain (guitar, piano, harp).
const ENVELOPE_PLUCK: EnvelopeCfg = EnvelopeCfg {
    attack_s: 0.005,
    decay_s: 0.2,
    sustain_level: 0.1,
    release_s: 0.3,
};

/// Slow attack, long sustain, slow release (strings, atmosphere).
const ENVELOPE_PAD: EnvelopeCfg = EnvelopeCfg {
    attack_s: 0.8,
    decay_s: 0.3,
    sustain_level: 0.8,
    release_s: 1.2,
};

/// Medium attack, good sustain, long release (sub and electric bass).
const ENVELOPE_BASS: EnvelopeCfg = EnvelopeCfg {
    attack_s: 0.02,
    decay_s: 0.15,
    sustain_level: 0.7,
    release_s: 0.8,
};

/// Fast attack, medium decay and sustain (lead synth, solo lines).
const ENVELOPE_LEAD: EnvelopeCfg = EnvelopeCfg {
    attack_s: 0.01,
    decay_s: 0.2,
    sustain_level: 0.6,
    release_s: 0.4,
};

const fn layer(wave: WaveKind, detune: f64, mix: f64, phase_offset: f64) -> ToneLayer {
    ToneLayer {
        wave,
        detune,
        mix,
        phase_offset,
    }
}

static CATALOGUE: [InstrumentSignature; InstrumentKind::COUNT] = [
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Square, 0.0, 0.5, 0.0),
                layer(WaveKind::Sawtooth, 0.03, 0.3, 180.0),
                layer(WaveKind::Square, -12.0, 0.15, 0.0),
                layer(WaveKind::Triangle, 12.0, 0.05, 90.0),
            ],
            filter: FilterCfg {
                kind: FilterKind::BandPass,
                cutoff_hz: 2500.0,
                resonance: 0.6,
            },
            envelope: ENVELOPE_LEAD,
        },
        name: "Lead Square",
        category: "Lead",
        description: "Rich square wave lead with sub-bass, detuning, and harmonic layers",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sawtooth, 0.0, 0.6, 0.0),
                layer(WaveKind::Square, -12.0, 0.25, 0.0),
                layer(WaveKind::Sine, -24.0, 0.15, 0.0),
                ToneLayer::SILENT,
            ],
            filter: FilterCfg {
                kind: FilterKind::LowPass,
                cutoff_hz: 800.0,
                resonance: 0.7,
            },
            envelope: ENVELOPE_BASS,
        },
        name: "Warm Bass",
        category: "Bass",
        description: "Rich analog-style bass with sub harmonics",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sine, 0.0, 0.4, 0.0),
                layer(WaveKind::Triangle, 7.0, 0.3, 90.0),
                layer(WaveKind::Sine, 12.0, 0.2, 180.0),
                layer(WaveKind::Triangle, 19.0, 0.1, 270.0),
            ],
            filter: FilterCfg {
                kind: FilterKind::LowPass,
                cutoff_hz: 2000.0,
                resonance: 0.1,
            },
            envelope: ENVELOPE_PAD,
        },
        name: "Ethereal Pad",
        category: "Pad",
        description: "Dreamy harmonic pad with gentle attack",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sawtooth, 0.0, 0.5, 0.0),
                layer(WaveKind::Square, 0.03, 0.3, 0.0),
                layer(WaveKind::Triangle, -0.03, 0.2, 0.0),
                ToneLayer::SILENT,
            ],
            filter: FilterCfg {
                kind: FilterKind::BandPass,
                cutoff_hz: 3000.0,
                resonance: 0.8,
            },
            envelope: ENVELOPE_PLUCK,
        },
        name: "Metallic Pluck",
        category: "Pluck",
        description: "Sharp attack pluck with metallic resonance",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sawtooth, 0.0, 0.7, 0.0),
                layer(WaveKind::Square, 0.07, 0.3, 180.0),
                ToneLayer::SILENT,
                ToneLayer::SILENT,
            ],
            filter: FilterCfg {
                kind: FilterKind::LowPass,
                cutoff_hz: 400.0,
                resonance: 0.9,
            },
            envelope: ENVELOPE_BASS,
        },
        name: "Wobble Bass",
        category: "Bass",
        description: "High resonance bass perfect for filter modulation",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sine, 0.0, 0.6, 0.0),
                layer(WaveKind::Sine, 12.0, 0.3, 0.0),
                layer(WaveKind::Sine, 19.0, 0.2, 0.0),
                layer(WaveKind::Triangle, 24.0, 0.1, 0.0),
            ],
            filter: FilterCfg {
                kind: FilterKind::BandPass,
                cutoff_hz: 1500.0,
                resonance: 0.3,
            },
            envelope: ENVELOPE_LEAD,
        },
        name: "Bell Lead",
        category: "Lead",
        description: "Bright bell-like lead with harmonic series",
    },
    InstrumentSignature {
        tone: Tone {
            layers: [
                layer(WaveKind::Sine, -12.0, 0.4, 0.0),
                layer(WaveKind::Triangle, -24.0, 0.4, 120.0),
                layer(WaveKind::Sawtooth, -12.02, 0.2, 240.0),
                ToneLayer::SILENT,
            ],
            filter: FilterCfg {
                kind: FilterKind::LowPass,
                cutoff_hz: 200.0,
                resonance: 0.5,
            },
            envelope: ENVELOPE_BASS,
        },
        name: "Deep Drone",
        category: "Drone",
        description: "Ultra-low frequency drone with subtle beating",
    },
];

/// Tone signature of an instrument.
pub fn signature(kind: InstrumentKind) -> &'static InstrumentSignature {
    &CATALOGUE[kind.index()]
}

/// Display metadata of an instrument.
pub fn info(kind: InstrumentKind) -> InstrumentInfo {
    let sig = signature(kind);
    InstrumentInfo {
        name: sig.name.to_string(),
        category: sig.category.to_string(),
        description: sig.description.to_string(),
    }
}

/// First instrument whose name or description contains `needle`
/// (case-insensitive).
pub fn find_by_name(needle: &str) -> Option<InstrumentKind> {
    let needle = needle.to_lowercase();
    InstrumentKind::ALL.into_iter().find(|kind| {
        let sig = signature(*kind);
        sig.name.to_lowercase().contains(&needle)
            || sig.description.to_lowercase().contains(&needle)
    })
}

/// Unique categories in catalogue order.
pub fn categories() -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for kind in InstrumentKind::ALL {
        let category = signature(kind).category;
        if !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}
