//! Waveform primitives and phase arithmetic
//!
//! All generators are pure functions over a phase in radians, except noise,
//! which draws from a per-voice RNG so concurrent voices stay reproducible
//! under a fixed seed.

use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::tone::WaveKind;

const TWO_PI: f64 = 2.0 * PI;

pub fn sine(phase: f64) -> f64 {
    phase.sin()
}

/// Square wave from the sign of the sine; +1 at the zero crossings.
pub fn square(phase: f64) -> f64 {
    if phase.sin() > 0.0 {
        1.0
    } else if phase.sin() < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Sawtooth in [-1, 1), rising through 0 at phase 0.
pub fn sawtooth(phase: f64) -> f64 {
    2.0 * (phase / TWO_PI - (phase / TWO_PI + 0.5).floor())
}

/// Triangle folded from the sawtooth, peaking at ±1.
pub fn triangle(phase: f64) -> f64 {
    let saw = sawtooth(phase);
    if saw > 0.0 {
        2.0 * saw - 1.0
    } else {
        -2.0 * saw - 1.0
    }
}

/// Per-voice noise generator, uniform in [-1, 1].
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// Sample a waveform at the given phase.
pub fn waveform_sample(kind: WaveKind, phase: f64, noise: &mut NoiseSource) -> f64 {
    match kind {
        WaveKind::None => 0.0,
        WaveKind::Sine => sine(phase),
        WaveKind::Square => square(phase),
        WaveKind::Sawtooth => sawtooth(phase),
        WaveKind::Triangle => triangle(phase),
        WaveKind::Noise => noise.sample(),
    }
}

/// Phase advance per sample for a frequency at the given rate.
pub fn phase_increment(frequency: f64, sample_rate: f64) -> f64 {
    TWO_PI * frequency / sample_rate
}

/// Wrap a phase into [0, 2π).
pub fn wrap_phase(mut phase: f64) -> f64 {
    while phase >= TWO_PI {
        phase -= TWO_PI;
    }
    while phase < 0.0 {
        phase += TWO_PI;
    }
    phase
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_sine_landmarks() {
        assert!((sine(0.0)).abs() < 1e-12);
        assert!((sine(FRAC_PI_2) - 1.0).abs() < 1e-12);
        assert!((sine(PI)).abs() < 1e-9);
    }

    #[test]
    fn test_square_is_sign_of_sine() {
        assert_eq!(square(FRAC_PI_2), 1.0);
        assert_eq!(square(PI + FRAC_PI_2), -1.0);
        // Zero crossing resolves to +1.
        assert_eq!(square(0.0), 1.0);
    }

    #[test]
    fn test_sawtooth_range_and_slope() {
        assert!((sawtooth(0.0)).abs() < 1e-12);
        // Just before the wrap the saw approaches +1, just after it is -1.
        assert!(sawtooth(PI - 1e-9) > 0.999);
        assert!(sawtooth(PI + 1e-9) < -0.999);
    }

    #[test]
    fn test_triangle_landmarks() {
        // Trough at 0, zero at π/2, peak at π, zero again at 3π/2.
        assert!((triangle(0.0) + 1.0).abs() < 1e-12);
        assert!(triangle(FRAC_PI_2).abs() < 1e-12);
        assert!((triangle(PI - 1e-9) - 1.0).abs() < 1e-6);
        assert!(triangle(3.0 * FRAC_PI_2).abs() < 1e-12);
        // Continuous across the saw wrap at π.
        assert!((triangle(PI - 1e-9) - triangle(PI + 1e-9)).abs() < 1e-6);
        // Bounds hold everywhere on a coarse sweep.
        for i in 0..1000 {
            let phase = i as f64 * TWO_PI / 1000.0;
            let value = triangle(phase);
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_noise_bounds_and_determinism() {
        let mut a = NoiseSource::new(42);
        let mut b = NoiseSource::new(42);
        for _ in 0..1000 {
            let sample = a.sample();
            assert!((-1.0..=1.0).contains(&sample));
            assert_eq!(sample, b.sample());
        }

        let mut c = NoiseSource::new(7);
        let first: Vec<f64> = (0..16).map(|_| c.sample()).collect();
        let mut d = NoiseSource::new(8);
        let second: Vec<f64> = (0..16).map(|_| d.sample()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_phase_increment() {
        let inc = phase_increment(440.0, 44100.0);
        assert!((inc - TWO_PI * 440.0 / 44100.0).abs() < 1e-15);
    }

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(TWO_PI + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_phase(-0.5) - (TWO_PI - 0.5)).abs() < 1e-12);
        assert_eq!(wrap_phase(0.0), 0.0);
    }
}
