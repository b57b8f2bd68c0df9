//! Phaser: swept allpass chain with feedback

use std::f64::consts::PI;

use super::{PedalProcessor, PEDAL_MAX_PARAMS};

/// Number of cascaded allpass stages.
const NUM_STAGES: usize = 4;

/// First-order allpass section with a coefficient swept by the LFO.
#[derive(Clone, Copy, Default)]
struct AllpassStage {
    coefficient: f64,
    state: f64,
}

impl AllpassStage {
    fn process(&mut self, input: f64) -> f64 {
        let output = -input + self.state;
        self.state = input + self.coefficient * output;
        output
    }
}

/// One channel of the phaser. Channels never share state, including the
/// feedback line.
pub struct Phaser {
    sample_rate: f64,

    stages: [AllpassStage; NUM_STAGES],
    lfo_phase: f64,
    feedback_state: f64,

    rate: f64,
    depth: f64,
    feedback: f64,
    wet_dry_mix: f64,
    center_freq: f64,
}

impl Phaser {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            stages: [AllpassStage::default(); NUM_STAGES],
            lfo_phase: 0.0,
            feedback_state: 0.0,
            rate: 0.5,
            depth: 0.8,
            feedback: 0.6,
            wet_dry_mix: 0.5,
            center_freq: 800.0,
        }
    }

    /// First-order allpass coefficient for a 90° point at `frequency`
    /// (bilinear transform).
    fn freq_to_coefficient(&self, frequency: f64) -> f64 {
        let omega = 2.0 * PI * frequency / self.sample_rate;
        (1.0 - (omega / 2.0).tan()) / (1.0 + (omega / 2.0).tan())
    }
}

impl PedalProcessor for Phaser {
    fn process_sample(&mut self, input: f64) -> f64 {
        let lfo_value = self.lfo_phase.sin();

        // Sweep around the center frequency; depth sets how far the notch
        // travels (up to 80 % of the center).
        let freq_variation = self.depth * self.center_freq * 0.8;
        let sweep_freq = (self.center_freq + lfo_value * freq_variation).clamp(50.0, 4000.0);

        // Spread the stages out so the notches do not stack on one
        // frequency.
        for i in 0..NUM_STAGES {
            let stage_freq = sweep_freq * (1.0 + i as f64 * 0.3);
            self.stages[i].coefficient = self.freq_to_coefficient(stage_freq);
        }

        let mut processed = input;
        for stage in &mut self.stages {
            processed = stage.process(processed);
        }

        // Feedback re-injection creates the resonant peaks.
        processed += self.feedback_state * self.feedback;
        self.feedback_state = processed * 0.5;

        let wet_signal = processed * self.wet_dry_mix;
        let dry_signal = input * (1.0 - self.wet_dry_mix);

        self.lfo_phase += 2.0 * PI * self.rate / self.sample_rate;
        if self.lfo_phase >= 2.0 * PI {
            self.lfo_phase -= 2.0 * PI;
        }

        wet_signal + dry_signal
    }

    fn set_params(&mut self, params: &[f64; PEDAL_MAX_PARAMS]) {
        self.rate = params[0].clamp(0.1, 10.0);
        self.depth = params[1].clamp(0.0, 1.0);
        self.feedback = params[2].clamp(0.0, 0.9);
        self.wet_dry_mix = params[3].clamp(0.0, 1.0);
        self.center_freq = params[4].clamp(100.0, 2000.0);
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.state = 0.0;
        }
        self.lfo_phase = 0.0;
        self.feedback_state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedal::{Pedal, PedalKind};

    fn phaser_with(params: [f64; 5]) -> Phaser {
        let mut phaser = Phaser::new(44100.0);
        let mut full = [0.0f64; PEDAL_MAX_PARAMS];
        full[..5].copy_from_slice(&params);
        phaser.set_params(&full);
        phaser
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut phaser = phaser_with([0.5, 0.8, 0.6, 0.5, 800.0]);
        for _ in 0..1000 {
            assert_eq!(phaser.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn test_fully_dry_mix_passes_input() {
        let mut phaser = phaser_with([0.5, 0.8, 0.0, 0.0, 800.0]);
        for i in 0..1000 {
            let x = (i as f64 * 0.13).sin();
            assert!((phaser.process_sample(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_wet_path_alters_signal() {
        let mut phaser = phaser_with([1.0, 0.8, 0.6, 1.0, 800.0]);
        let mut differs = false;
        for i in 0..4096 {
            let x = (2.0 * PI * 440.0 * i as f64 / 44100.0).sin();
            let y = phaser.process_sample(x);
            if (y - x).abs() > 1e-6 {
                differs = true;
            }
        }
        assert!(differs);
    }

    #[test]
    fn test_output_remains_bounded() {
        // Max feedback must not blow up on a sustained full-scale input.
        let mut phaser = phaser_with([5.0, 1.0, 0.9, 1.0, 2000.0]);
        for i in 0..44100 {
            let x = (2.0 * PI * 700.0 * i as f64 / 44100.0).sin();
            let y = phaser.process_sample(x);
            assert!(y.is_finite());
            assert!(y.abs() < 10.0, "unbounded output {}", y);
        }
    }

    #[test]
    fn test_channels_do_not_share_feedback() {
        let mut pedal = Pedal::new(PedalKind::Phaser, 44100.0);
        // Drive only the left channel hard; a silent right channel must
        // stay silent, which fails if the feedback line were shared.
        for _ in 0..2000 {
            let (_, r) = pedal.process_pair(0.9, 0.0);
            assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn test_params_are_clamped() {
        let phaser = phaser_with([100.0, 5.0, 5.0, 5.0, 50_000.0]);
        assert_eq!(phaser.rate, 10.0);
        assert_eq!(phaser.depth, 1.0);
        assert_eq!(phaser.feedback, 0.9);
        assert_eq!(phaser.wet_dry_mix, 1.0);
        assert_eq!(phaser.center_freq, 2000.0);
    }
}
