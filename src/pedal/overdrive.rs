//! Overdrive / soft-clipping distortion

use super::{PedalProcessor, PEDAL_MAX_PARAMS};

/// One channel of the overdrive. Stateless apart from the two one-pole
/// tone-filter accumulators.
pub struct Overdrive {
    gain: f64,
    drive: f64,
    tone: f64,
    output_level: f64,
    asymmetry: f64,

    low_pass_state: f64,
    high_pass_state: f64,
}

impl Overdrive {
    pub fn new(_sample_rate: f64) -> Self {
        Self {
            gain: 3.0,
            drive: 0.6,
            tone: 0.7,
            output_level: 0.8,
            asymmetry: 0.3,
            low_pass_state: 0.0,
            high_pass_state: 0.0,
        }
    }

    /// tanh soft clip; drive widens the input so the knee engages earlier.
    fn soft_clip(&self, input: f64) -> f64 {
        let driven = input * (1.0 + self.drive * 4.0);
        driven.tanh() * 0.7
    }

    /// Attenuate the negative half-wave to add even harmonics.
    fn asymmetric_clip(&self, input: f64) -> f64 {
        if input >= 0.0 {
            input
        } else {
            input * (1.0 - self.asymmetry * 0.5)
        }
    }

    /// Blend of a one-pole low-pass and a DC-blocking high-pass.
    fn apply_tone(&mut self, input: f64) -> f64 {
        let lp_cutoff = 0.1 + self.tone * 0.4;
        self.low_pass_state += lp_cutoff * (input - self.low_pass_state);

        let hp_cutoff = 0.02;
        self.high_pass_state += hp_cutoff * (input - self.high_pass_state);
        let hp_output = input - self.high_pass_state;

        self.low_pass_state * (1.0 - self.tone * 0.3) + hp_output * (self.tone * 0.3)
    }
}

impl PedalProcessor for Overdrive {
    fn process_sample(&mut self, input: f64) -> f64 {
        let gained = input * self.gain;
        let asymmetric = self.asymmetric_clip(gained);
        let distorted = self.soft_clip(asymmetric);
        let toned = self.apply_tone(distorted);
        let output = toned * self.output_level;

        // Hard limit against digital clipping downstream.
        output.clamp(-1.0, 1.0)
    }

    fn set_params(&mut self, params: &[f64; PEDAL_MAX_PARAMS]) {
        self.gain = params[0].clamp(1.0, 20.0);
        self.drive = params[1].clamp(0.0, 1.0);
        self.tone = params[2].clamp(0.0, 1.0);
        self.output_level = params[3].clamp(0.0, 2.0);
        self.asymmetry = params[4].clamp(0.0, 1.0);
    }

    fn reset(&mut self) {
        self.low_pass_state = 0.0;
        self.high_pass_state = 0.0;
    }
}
