//! Schroeder-style reverb
//!
//! Four parallel feedback comb filters with a one-pole low-pass in each
//! feedback path, followed by two series allpass filters, preceded by a
//! pre-delay line. Comb feedback is derived from the decay time so a tail
//! falls 60 dB over `decay_time` seconds, scaled by the room size.

use super::{PedalProcessor, PEDAL_MAX_PARAMS};

/// Comb delay lengths in samples at the 44.1 kHz reference rate.
const COMB_DELAYS: [usize; 4] = [1116, 1188, 1277, 1356];
/// Allpass delay lengths at the reference rate.
const ALLPASS_DELAYS: [usize; 2] = [556, 441];
/// Pre-delay line capacity; bounds the 100 ms maximum at any sample rate.
const MAX_PREDELAY_SAMPLES: usize = 48000;

struct CombFilter {
    buffer: Vec<f64>,
    write_index: usize,
    feedback: f64,
    damping: f64,
    filter_state: f64,
}

impl CombFilter {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_index: 0,
            feedback: 0.5,
            damping: 0.5,
            filter_state: 0.0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let delayed = self.buffer[self.write_index];

        // One-pole low-pass in the feedback path damps the high end of the
        // tail.
        self.filter_state = delayed * (1.0 - self.damping) + self.filter_state * self.damping;

        self.buffer[self.write_index] = input + self.filter_state * self.feedback;
        self.write_index = (self.write_index + 1) % self.buffer.len();

        delayed
    }

    /// Delay length in seconds at the given rate.
    fn delay_seconds(&self, sample_rate: f64) -> f64 {
        self.buffer.len() as f64 / sample_rate
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
        self.filter_state = 0.0;
    }
}

struct AllpassFilter {
    buffer: Vec<f64>,
    write_index: usize,
    feedback: f64,
}

impl AllpassFilter {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_index: 0,
            feedback: 0.7,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let delayed = self.buffer[self.write_index];
        let output = -input + delayed;

        self.buffer[self.write_index] = input + delayed * self.feedback;
        self.write_index = (self.write_index + 1) % self.buffer.len();

        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
    }
}

struct DelayLine {
    buffer: Vec<f64>,
    write_index: usize,
}

impl DelayLine {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            write_index: 0,
        }
    }

    fn process(&mut self, input: f64, delay_samples: usize) -> f64 {
        if delay_samples == 0 {
            return input;
        }
        let delay_samples = delay_samples.min(self.buffer.len() - 1);

        let read_index =
            (self.write_index + self.buffer.len() - delay_samples) % self.buffer.len();
        let delayed = self.buffer[read_index];

        self.buffer[self.write_index] = input;
        self.write_index = (self.write_index + 1) % self.buffer.len();

        delayed
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_index = 0;
    }
}

/// One channel of the reverb network.
pub struct Reverb {
    sample_rate: f64,

    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
    predelay: DelayLine,

    room_size: f64,
    decay_time: f64,
    damping: f64,
    wet_dry_mix: f64,
    predelay_ms: f64,
    output_level: f64,
}

impl Reverb {
    pub fn new(sample_rate: f64) -> Self {
        // Delay lengths are specified at 44.1 kHz and scaled to the actual
        // rate so the room dimensions stay constant.
        let scale = sample_rate / 44100.0;

        Self {
            sample_rate,
            combs: COMB_DELAYS
                .iter()
                .map(|&delay| CombFilter::new((delay as f64 * scale) as usize))
                .collect(),
            allpasses: ALLPASS_DELAYS
                .iter()
                .map(|&delay| AllpassFilter::new((delay as f64 * scale) as usize))
                .collect(),
            predelay: DelayLine::new(MAX_PREDELAY_SAMPLES),
            room_size: 0.5,
            decay_time: 2.0,
            damping: 0.5,
            wet_dry_mix: 0.3,
            predelay_ms: 20.0,
            output_level: 1.0,
        }
    }
}

impl PedalProcessor for Reverb {
    fn process_sample(&mut self, input: f64) -> f64 {
        let predelay_samples = (self.predelay_ms * self.sample_rate / 1000.0) as usize;
        let delayed_input = self.predelay.process(input, predelay_samples);

        // Parallel comb bank.
        let mut comb_output = 0.0;
        for comb in &mut self.combs {
            comb_output += comb.process(delayed_input);
        }

        // Series allpass diffusion.
        let mut wet = comb_output;
        for allpass in &mut self.allpasses {
            wet = allpass.process(wet);
        }

        let wet_signal = wet * self.wet_dry_mix;
        let dry_signal = input * (1.0 - self.wet_dry_mix);

        self.output_level * (wet_signal + dry_signal)
    }

    fn set_params(&mut self, params: &[f64; PEDAL_MAX_PARAMS]) {
        self.room_size = params[0].clamp(0.0, 1.0);
        self.decay_time = params[1].clamp(0.1, 10.0);
        self.damping = params[2].clamp(0.0, 1.0);
        self.wet_dry_mix = params[3].clamp(0.0, 1.0);
        self.predelay_ms = params[4].clamp(0.0, 100.0);
        self.output_level = params[5].clamp(0.0, 2.0);

        // Comb feedback: -60 dB after decay_time, weighted by room size.
        for comb in &mut self.combs {
            let delay_time = comb.delay_seconds(self.sample_rate);
            comb.feedback = 0.001f64.powf(delay_time / self.decay_time) * self.room_size;
            comb.damping = self.damping;
        }

        for allpass in &mut self.allpasses {
            allpass.feedback = 0.7 * self.room_size;
        }
    }

    fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
        self.predelay.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedal::{schema, Pedal, PedalKind};

    fn configured_reverb() -> Reverb {
        let mut reverb = Reverb::new(44100.0);
        let mut params = [0.0f64; PEDAL_MAX_PARAMS];
        for (slot, spec) in params.iter_mut().zip(schema(PedalKind::Reverb).params) {
            *slot = spec.default;
        }
        reverb.set_params(&params);
        reverb
    }

    #[test]
    fn test_impulse_produces_tail() {
        let mut reverb = configured_reverb();
        let mut tail_energy = 0.0;

        let first = reverb.process_sample(1.0);
        // Dry path is audible immediately.
        assert!(first.abs() > 0.0);

        // The wet tail shows up after the pre-delay (50 ms ≈ 2205 samples)
        // plus the comb delays.
        for _ in 0..20000 {
            tail_energy += reverb.process_sample(0.0).abs();
        }
        assert!(tail_energy > 0.01, "tail energy {}", tail_energy);
    }

    #[test]
    fn test_longer_decay_longer_tail() {
        let tail = |decay: f64| {
            let mut reverb = Reverb::new(44100.0);
            let mut params = [0.0f64; PEDAL_MAX_PARAMS];
            params[0] = 1.0; // room size
            params[1] = decay;
            params[2] = 0.1;
            params[3] = 1.0; // fully wet
            params[4] = 0.0; // no pre-delay
            params[5] = 1.0;
            reverb.set_params(&params);

            reverb.process_sample(1.0);
            let mut late = 0.0;
            for i in 0..44100 {
                let y = reverb.process_sample(0.0).abs();
                if i > 22050 {
                    late += y;
                }
            }
            late
        };

        assert!(tail(5.0) > tail(0.3) * 2.0);
    }

    #[test]
    fn test_dry_only_mix_passes_input() {
        let mut reverb = Reverb::new(44100.0);
        let mut params = [0.0f64; PEDAL_MAX_PARAMS];
        params[0] = 0.5;
        params[1] = 1.0;
        params[2] = 0.5;
        params[3] = 0.0; // fully dry
        params[4] = 0.0;
        params[5] = 1.0;
        reverb.set_params(&params);

        for i in 0..256 {
            let x = (i as f64 * 0.1).sin();
            assert!((reverb.process_sample(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reset_silences_tail() {
        let mut reverb = configured_reverb();
        for _ in 0..1000 {
            reverb.process_sample(0.7);
        }
        reverb.reset();
        // With no dry input and cleared delay lines the output is silent.
        for _ in 0..100 {
            assert_eq!(reverb.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn test_dual_mono_instances_are_independent() {
        let mut pedal = Pedal::new(PedalKind::Reverb, 44100.0);
        // Excite only the left channel; the right stays silent apart from
        // its dry path.
        for _ in 0..5000 {
            let (_, r) = pedal.process_pair(0.9, 0.0);
            assert_eq!(r, 0.0);
        }
    }
}
