//! Effect pedals and the pedal chain
//!
//! A pedal is one post-mix stereo effect: a parameter vector, a bypass
//! flag, and two independent instances of the same algorithm, one per
//! channel ("dual mono": there is deliberately no cross-channel state).
//! The chain is an ordered list the controller can rearrange at will.

pub mod overdrive;
pub mod phaser;
pub mod reverb;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use overdrive::Overdrive;
use phaser::Phaser;
use reverb::Reverb;

/// Length of every pedal's parameter vector; only the first
/// `schema().params.len()` entries are meaningful.
pub const PEDAL_MAX_PARAMS: usize = 12;

/// The effect algorithms a pedal can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PedalKind {
    Reverb,
    Overdrive,
    Phaser,
}

/// Per-channel effect state. Each pedal owns two of these, processing the
/// left and right channels independently.
pub trait PedalProcessor: Send + Sync {
    /// Transform one sample.
    fn process_sample(&mut self, input: f64) -> f64;
    /// Apply the (already stored) parameter vector, clamping to the
    /// documented ranges.
    fn set_params(&mut self, params: &[f64; PEDAL_MAX_PARAMS]);
    /// Clear delay lines and modulation state.
    fn reset(&mut self);
}

/// Bounds and default of one pedal parameter.
#[derive(Debug, Clone, Copy)]
pub struct PedalParamSpec {
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// Static description of a pedal type: display metadata plus the parameter
/// schema that drives UI defaults and bounds.
#[derive(Debug, Clone, Copy)]
pub struct PedalSchema {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub params: &'static [PedalParamSpec],
}

const REVERB_PARAMS: [PedalParamSpec; 6] = [
    PedalParamSpec {
        name: "Room Size",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 1.0,
    },
    PedalParamSpec {
        name: "Decay Time",
        unit: "s",
        min: 0.1,
        max: 10.0,
        default: 0.8,
    },
    PedalParamSpec {
        name: "Damping",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.1,
    },
    PedalParamSpec {
        name: "Wet/Dry Mix",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.8,
    },
    PedalParamSpec {
        name: "Pre-delay",
        unit: "ms",
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
    PedalParamSpec {
        name: "Output Level",
        unit: "",
        min: 0.0,
        max: 2.0,
        default: 0.5,
    },
];

const OVERDRIVE_PARAMS: [PedalParamSpec; 5] = [
    PedalParamSpec {
        name: "Gain",
        unit: "x",
        min: 1.0,
        max: 20.0,
        default: 3.0,
    },
    PedalParamSpec {
        name: "Drive",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.6,
    },
    PedalParamSpec {
        name: "Tone",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.7,
    },
    PedalParamSpec {
        name: "Output Level",
        unit: "",
        min: 0.0,
        max: 2.0,
        default: 0.8,
    },
    PedalParamSpec {
        name: "Asymmetry",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.3,
    },
];

const PHASER_PARAMS: [PedalParamSpec; 5] = [
    PedalParamSpec {
        name: "Rate",
        unit: "Hz",
        min: 0.1,
        max: 10.0,
        default: 0.5,
    },
    PedalParamSpec {
        name: "Depth",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.8,
    },
    PedalParamSpec {
        name: "Feedback",
        unit: "",
        min: 0.0,
        max: 0.9,
        default: 0.6,
    },
    PedalParamSpec {
        name: "Wet/Dry Mix",
        unit: "",
        min: 0.0,
        max: 1.0,
        default: 0.5,
    },
    PedalParamSpec {
        name: "Center Freq",
        unit: "Hz",
        min: 100.0,
        max: 2000.0,
        default: 800.0,
    },
];

static REVERB_SCHEMA: PedalSchema = PedalSchema {
    name: "Reverb",
    category: "Spatial",
    description: "Digital reverb effect with room simulation",
    params: &REVERB_PARAMS,
};

static OVERDRIVE_SCHEMA: PedalSchema = PedalSchema {
    name: "Overdrive",
    category: "Distortion",
    description: "Warm overdrive with tone control and asymmetric clipping",
    params: &OVERDRIVE_PARAMS,
};

static PHASER_SCHEMA: PedalSchema = PedalSchema {
    name: "Phaser",
    category: "Modulation",
    description: "Classic phaser with sweeping allpass filters",
    params: &PHASER_PARAMS,
};

/// Parameter schema and display metadata of a pedal type.
pub fn schema(kind: PedalKind) -> &'static PedalSchema {
    match kind {
        PedalKind::Reverb => &REVERB_SCHEMA,
        PedalKind::Overdrive => &OVERDRIVE_SCHEMA,
        PedalKind::Phaser => &PHASER_SCHEMA,
    }
}

/// Snapshot of one pedal parameter for UI consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedalParamInfo {
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub current: f64,
}

/// Snapshot of a pedal in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedalInfo {
    pub kind: PedalKind,
    pub name: String,
    pub category: String,
    pub description: String,
    pub bypass: bool,
    pub params: Vec<PedalParamInfo>,
}

/// One effect pedal: parameter vector, bypass flag, and independent
/// left/right channel instances.
pub struct Pedal {
    kind: PedalKind,
    bypass: AtomicBool,
    params: [f64; PEDAL_MAX_PARAMS],
    left: Box<dyn PedalProcessor>,
    right: Box<dyn PedalProcessor>,
}

impl Pedal {
    /// Build a pedal of the given kind with its schema defaults applied.
    pub fn new(kind: PedalKind, sample_rate: f64) -> Self {
        let make = |fs: f64| -> Box<dyn PedalProcessor> {
            match kind {
                PedalKind::Reverb => Box::new(Reverb::new(fs)),
                PedalKind::Overdrive => Box::new(Overdrive::new(fs)),
                PedalKind::Phaser => Box::new(Phaser::new(fs)),
            }
        };

        let mut params = [0.0f64; PEDAL_MAX_PARAMS];
        for (slot, spec) in params.iter_mut().zip(schema(kind).params) {
            *slot = spec.default;
        }

        let mut pedal = Self {
            kind,
            bypass: AtomicBool::new(false),
            params,
            left: make(sample_rate),
            right: make(sample_rate),
        };
        pedal.left.set_params(&pedal.params);
        pedal.right.set_params(&pedal.params);
        pedal
    }

    pub fn kind(&self) -> PedalKind {
        self.kind
    }

    pub fn is_bypass(&self) -> bool {
        self.bypass.load(Ordering::Relaxed)
    }

    pub fn set_bypass(&self, bypass: bool) {
        self.bypass.store(bypass, Ordering::Relaxed);
    }

    /// Store one parameter and push the whole vector to both channel
    /// instances. Out-of-range values are clamped by the processors.
    pub fn set_param(&mut self, param_idx: usize, value: f64) -> bool {
        if param_idx >= schema(self.kind).params.len() {
            return false;
        }
        self.params[param_idx] = value;
        self.left.set_params(&self.params);
        self.right.set_params(&self.params);
        true
    }

    /// Run one stereo pair through both channel instances.
    pub fn process_pair(&mut self, left: f64, right: f64) -> (f64, f64) {
        (
            self.left.process_sample(left),
            self.right.process_sample(right),
        )
    }

    pub fn info(&self) -> PedalInfo {
        let schema = schema(self.kind);
        PedalInfo {
            kind: self.kind,
            name: schema.name.to_string(),
            category: schema.category.to_string(),
            description: schema.description.to_string(),
            bypass: self.is_bypass(),
            params: schema
                .params
                .iter()
                .enumerate()
                .map(|(i, spec)| PedalParamInfo {
                    name: spec.name.to_string(),
                    unit: spec.unit.to_string(),
                    min: spec.min,
                    max: spec.max,
                    default: spec.default,
                    current: self.params[i],
                })
                .collect(),
        }
    }
}

/// Ordered list of pedals. Mutations come only from the controller API;
/// the engine guards the chain with a lock so the pedal worker never sees
/// a partially modified list.
#[derive(Default)]
pub struct PedalChain {
    pedals: Vec<Pedal>,
}

impl PedalChain {
    pub fn new() -> Self {
        Self { pedals: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.pedals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pedals.is_empty()
    }

    /// Append a pedal and return its index.
    pub fn append(&mut self, pedal: Pedal) -> usize {
        self.pedals.push(pedal);
        self.pedals.len() - 1
    }

    /// Insert at `idx` (existing pedals shift right). Fails on an
    /// out-of-range index.
    pub fn insert(&mut self, idx: usize, pedal: Pedal) -> bool {
        if idx > self.pedals.len() {
            return false;
        }
        self.pedals.insert(idx, pedal);
        true
    }

    /// Remove the pedal at `idx`. Fails on an out-of-range index.
    pub fn remove(&mut self, idx: usize) -> bool {
        if idx >= self.pedals.len() {
            return false;
        }
        self.pedals.remove(idx);
        true
    }

    /// Swap two pedals. Fails when either index is out of range or both
    /// are the same.
    pub fn swap(&mut self, idx1: usize, idx2: usize) -> bool {
        if idx1 == idx2 || idx1 >= self.pedals.len() || idx2 >= self.pedals.len() {
            return false;
        }
        self.pedals.swap(idx1, idx2);
        true
    }

    pub fn get(&self, idx: usize) -> Option<&Pedal> {
        self.pedals.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Pedal> {
        self.pedals.get_mut(idx)
    }

    /// Drop all pedals (and their instances) from the chain.
    pub fn clear(&mut self) {
        self.pedals.clear();
    }

    /// Run a stereo pair through every non-bypassed pedal in order. An
    /// empty (or fully bypassed) chain is an identity stage.
    pub fn process_pair(&mut self, mut left: f64, mut right: f64) -> (f64, f64) {
        for pedal in &mut self.pedals {
            if pedal.is_bypass() {
                continue;
            }
            let (l, r) = pedal.process_pair(left, right);
            left = l;
            right = r;
        }
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 44100.0;

    #[test]
    fn test_schema_counts() {
        assert_eq!(schema(PedalKind::Reverb).params.len(), 6);
        assert_eq!(schema(PedalKind::Overdrive).params.len(), 5);
        assert_eq!(schema(PedalKind::Phaser).params.len(), 5);
    }

    #[test]
    fn test_schema_defaults() {
        let reverb = schema(PedalKind::Reverb);
        assert_eq!(reverb.params[0].default, 1.0);
        assert_eq!(reverb.params[1].default, 0.8);
        assert_eq!(reverb.params[4].default, 50.0);
        assert_eq!(reverb.params[5].max, 2.0);

        let overdrive = schema(PedalKind::Overdrive);
        assert_eq!(overdrive.params[0].min, 1.0);
        assert_eq!(overdrive.params[0].max, 20.0);
        assert_eq!(overdrive.params[0].default, 3.0);

        let phaser = schema(PedalKind::Phaser);
        assert_eq!(phaser.params[2].max, 0.9);
        assert_eq!(phaser.params[4].default, 800.0);
    }

    #[test]
    fn test_new_pedal_carries_defaults() {
        let pedal = Pedal::new(PedalKind::Overdrive, FS);
        let info = pedal.info();
        assert_eq!(info.name, "Overdrive");
        assert!(!info.bypass);
        for param in &info.params {
            assert_eq!(param.current, param.default);
        }
    }

    #[test]
    fn test_set_param_bounds() {
        let mut pedal = Pedal::new(PedalKind::Phaser, FS);
        assert!(pedal.set_param(0, 2.0));
        assert_eq!(pedal.info().params[0].current, 2.0);
        // Only the schema's parameters are addressable.
        assert!(!pedal.set_param(5, 1.0));
        assert!(!pedal.set_param(PEDAL_MAX_PARAMS, 1.0));
    }

    #[test]
    fn test_bypassed_pedal_is_identity_in_chain() {
        let mut chain = PedalChain::new();
        let pedal = Pedal::new(PedalKind::Overdrive, FS);
        pedal.set_bypass(true);
        chain.append(pedal);

        for i in 0..64 {
            let x = (i as f64 * 0.11).sin() * 0.5;
            let (l, r) = chain.process_pair(x, -x);
            assert_eq!(l, x);
            assert_eq!(r, -x);
        }
    }

    #[test]
    fn test_chain_append_remove() {
        let mut chain = PedalChain::new();
        assert_eq!(chain.append(Pedal::new(PedalKind::Reverb, FS)), 0);
        assert_eq!(chain.append(Pedal::new(PedalKind::Phaser, FS)), 1);
        let before = chain.len();

        assert_eq!(chain.append(Pedal::new(PedalKind::Overdrive, FS)), 2);
        assert!(chain.remove(2));
        assert_eq!(chain.len(), before);

        assert!(!chain.remove(5));
        assert_eq!(chain.len(), before);
    }

    #[test]
    fn test_chain_swap_is_involutive() {
        let mut chain = PedalChain::new();
        chain.append(Pedal::new(PedalKind::Reverb, FS));
        chain.append(Pedal::new(PedalKind::Overdrive, FS));
        chain.append(Pedal::new(PedalKind::Phaser, FS));

        assert!(chain.swap(0, 2));
        assert_eq!(chain.get(0).unwrap().kind(), PedalKind::Phaser);
        assert!(chain.swap(0, 2));
        assert_eq!(chain.get(0).unwrap().kind(), PedalKind::Reverb);
        assert_eq!(chain.get(2).unwrap().kind(), PedalKind::Phaser);

        // Degenerate swaps are rejected without touching the chain.
        assert!(!chain.swap(1, 1));
        assert!(!chain.swap(0, 3));
    }

    #[test]
    fn test_chain_insert() {
        let mut chain = PedalChain::new();
        chain.append(Pedal::new(PedalKind::Reverb, FS));
        assert!(chain.insert(0, Pedal::new(PedalKind::Phaser, FS)));
        assert_eq!(chain.get(0).unwrap().kind(), PedalKind::Phaser);
        assert_eq!(chain.get(1).unwrap().kind(), PedalKind::Reverb);

        // Inserting at len() appends; beyond that is rejected.
        assert!(chain.insert(2, Pedal::new(PedalKind::Overdrive, FS)));
        assert!(!chain.insert(5, Pedal::new(PedalKind::Overdrive, FS)));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let mut chain = PedalChain::new();
        let (l, r) = chain.process_pair(0.25, -0.75);
        assert_eq!(l, 0.25);
        assert_eq!(r, -0.75);
    }
}
