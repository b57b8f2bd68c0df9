//! ADSR amplitude envelope
//!
//! Linear-ramp state machine over absolute stage times. Attack ramps from
//! the current level to 1.0, decay down to the sustain level, sustain holds
//! until note-off, release ramps back to zero and parks the envelope in
//! `Idle`. Stages with a non-positive time complete instantly.

use crate::tone::EnvelopeCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: AdsrState,
    current_level: f64,
    rate: f64,
    attack_s: f64,
    decay_s: f64,
    sustain_level: f64,
    release_s: f64,
}

impl AdsrEnvelope {
    pub fn new(cfg: &EnvelopeCfg) -> Self {
        Self {
            state: AdsrState::Idle,
            current_level: 0.0,
            rate: 0.0,
            attack_s: cfg.attack_s,
            decay_s: cfg.decay_s,
            sustain_level: cfg.sustain_level,
            release_s: cfg.release_s,
        }
    }

    pub fn state(&self) -> AdsrState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != AdsrState::Idle
    }

    /// Return to idle with the level cleared.
    pub fn reset(&mut self) {
        self.state = AdsrState::Idle;
        self.current_level = 0.0;
        self.rate = 0.0;
    }

    /// Begin the attack ramp from the current level.
    pub fn note_on(&mut self) {
        self.state = AdsrState::Attack;
        if self.attack_s > 0.0 {
            self.rate = (1.0 - self.current_level) / self.attack_s;
        } else {
            self.current_level = 1.0;
            self.rate = 0.0;
        }
    }

    /// Begin the release ramp from wherever the level currently is.
    pub fn note_off(&mut self) {
        self.state = AdsrState::Release;
        if self.release_s > 0.0 {
            self.rate = -self.current_level / self.release_s;
        } else {
            self.current_level = 0.0;
            self.rate = 0.0;
        }
    }

    /// Advance the envelope by `delta_time` seconds and return the gain.
    pub fn process(&mut self, delta_time: f64) -> f64 {
        match self.state {
            AdsrState::Idle => {
                self.current_level = 0.0;
            }

            AdsrState::Attack => {
                if self.attack_s <= 0.0 {
                    self.current_level = 1.0;
                    self.enter_decay();
                } else {
                    self.current_level += self.rate * delta_time;
                    if self.current_level >= 1.0 {
                        self.current_level = 1.0;
                        self.enter_decay();
                    }
                }
            }

            AdsrState::Decay => {
                if self.decay_s <= 0.0 {
                    self.current_level = self.sustain_level;
                    self.state = AdsrState::Sustain;
                    self.rate = 0.0;
                } else {
                    self.current_level += self.rate * delta_time;
                    if self.current_level <= self.sustain_level {
                        self.current_level = self.sustain_level;
                        self.state = AdsrState::Sustain;
                        self.rate = 0.0;
                    }
                }
            }

            AdsrState::Sustain => {
                self.current_level = self.sustain_level;
            }

            AdsrState::Release => {
                if self.release_s <= 0.0 {
                    self.current_level = 0.0;
                    self.state = AdsrState::Idle;
                    self.rate = 0.0;
                } else {
                    self.current_level += self.rate * delta_time;
                    if self.current_level <= 0.0 {
                        self.current_level = 0.0;
                        self.state = AdsrState::Idle;
                        self.rate = 0.0;
                    }
                }
            }
        }

        self.current_level.clamp(0.0, 1.0)
    }

    fn enter_decay(&mut self) {
        self.state = AdsrState::Decay;
        if self.decay_s > 0.0 {
            self.rate = (self.sustain_level - self.current_level) / self.decay_s;
        } else {
            self.current_level = self.sustain_level;
            self.rate = 0.0;
        }
    }
}
