//! Polyphonic voice slots
//!
//! A `VoiceSlot` is one lane of polyphony: the lock-free ring the mixer
//! drains, the lifecycle flags, and the note parameters handed from the
//! controller to the slot's producer thread. The per-note DSP state
//! (`VoiceDsp`) lives entirely on the producer side and is rebuilt for
//! every note, so the slot itself stays cheap to share.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::{MAX_TONE_LAYERS, VOICE_RING_SIZE};
use crate::dsp::biquad::BiquadFilter;
use crate::dsp::envelope::AdsrEnvelope;
use crate::dsp::oscillator::{self, NoiseSource};
use crate::note::ControlMode;
use crate::ring::SpscRing;
use crate::tone::{FilterKind, Tone};

/// Envelope gain below which a voice skips oscillator work and emits
/// silence. Voices are one-shot, so phase continuity across the gap does
/// not matter.
const GAIN_EPSILON: f64 = 1e-4;

/// Note parameters handed from the controller to the producer thread.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoiceNote {
    pub tone: &'static Tone,
    pub frequency: f64,
    pub amplitude: f64,
    pub duration_ms: i32,
    pub control_mode: ControlMode,
    /// Seed for the per-voice noise RNG; derived from slot index and note
    /// generation so renders are reproducible.
    pub seed: u64,
}

/// One slot of polyphony, shared between the controller, the slot's
/// producer thread and the mix worker.
pub(crate) struct VoiceSlot {
    index: usize,
    /// Sample ring between this slot's producer and the mixer. The write
    /// and read halves are split off at worker spawn; this handle keeps
    /// the reset and fill queries.
    pub ring: SpscRing,
    active: AtomicBool,
    ended: AtomicBool,
    /// Bumped on every note start; the producer rebuilds its DSP state
    /// when it sees a new generation.
    generation: AtomicU64,
    pan_bits: AtomicU64,
    note: Mutex<Option<VoiceNote>>,
}

impl VoiceSlot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ring: SpscRing::new(VOICE_RING_SIZE),
            active: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            pan_bits: AtomicU64::new(0.5f64.to_bits()),
            note: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Relaxed)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn pan(&self) -> f64 {
        f64::from_bits(self.pan_bits.load(Ordering::Relaxed))
    }

    pub fn note_snapshot(&self) -> Option<VoiceNote> {
        *self.note.lock()
    }

    /// Publish a new note on this (idle) slot. Everything the producer and
    /// mixer read is in place before `active` flips to true; that ordering
    /// is what lets them trust the slot's state the moment they observe it
    /// active.
    pub fn start(&self, tone: &'static Tone, frequency: f64, amplitude: f64, pan: f64,
                 duration_ms: i32, control_mode: ControlMode) -> u64 {
        let generation = self.generation.load(Ordering::Relaxed) + 1;
        let seed = ((self.index as u64) << 32) ^ generation;

        // The slot is idle, so neither the producer nor the mixer touches
        // the ring while we rewind it.
        self.ring.reset();
        self.pan_bits.store(pan.to_bits(), Ordering::Relaxed);
        *self.note.lock() = Some(VoiceNote {
            tone,
            frequency,
            amplitude,
            duration_ms,
            control_mode,
            seed,
        });
        self.ended.store(false, Ordering::Release);
        self.generation.store(generation, Ordering::Release);
        self.active.store(true, Ordering::Release);
        generation
    }

    /// Note-off: flag the voice as ended. The producer triggers the
    /// envelope release on its next iteration. Idempotent, and a no-op on
    /// an idle slot.
    pub fn end(&self) {
        if self.is_active() {
            self.ended.store(true, Ordering::Release);
        }
    }

    /// Producer side: the envelope finished, reclaim the slot.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Drop any note state outright (controller cleanup path).
    pub fn force_idle(&self) {
        self.active.store(false, Ordering::Release);
        self.ended.store(false, Ordering::Release);
        *self.note.lock() = None;
    }
}

/// Per-note synthesis state, owned by the producer thread.
pub(crate) struct VoiceDsp {
    tone: &'static Tone,
    frequency: f64,
    amplitude: f64,
    duration_ms: i32,
    control_mode: ControlMode,
    sample_rate: f64,

    phases: [f64; MAX_TONE_LAYERS],
    envelope: AdsrEnvelope,
    filter: BiquadFilter,
    noise: NoiseSource,

    /// Seconds of audio generated so far; drives duration-mode note-off.
    elapsed: f64,
    released: bool,
}

impl VoiceDsp {
    pub fn new(note: &VoiceNote, sample_rate: f64) -> Self {
        let mut envelope = AdsrEnvelope::new(&note.tone.envelope);
        envelope.note_on();

        Self {
            tone: note.tone,
            frequency: note.frequency,
            amplitude: note.amplitude,
            duration_ms: note.duration_ms,
            control_mode: note.control_mode,
            sample_rate,
            phases: [0.0; MAX_TONE_LAYERS],
            envelope,
            filter: BiquadFilter::new(note.tone.filter, sample_rate),
            noise: NoiseSource::new(note.seed),
            elapsed: 0.0,
            released: false,
        }
    }

    /// True once the envelope has run out and the slot can be reclaimed.
    pub fn is_finished(&self) -> bool {
        !self.envelope.is_active()
    }

    /// Trigger the envelope release once.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.envelope.note_off();
        }
    }

    /// Generate the next sample.
    pub fn step(&mut self, delta_time: f64) -> f64 {
        self.elapsed += delta_time;
        if self.control_mode == ControlMode::Duration
            && !self.released
            && self.elapsed * 1000.0 >= self.duration_ms as f64
        {
            self.release();
        }

        let gain = self.envelope.process(delta_time);
        if gain < GAIN_EPSILON {
            return 0.0;
        }

        let base_increment = oscillator::phase_increment(self.frequency, self.sample_rate);
        let mut mixed = 0.0;

        for (i, layer) in self.tone.active_layers().iter().enumerate() {
            let detuned_increment = base_increment * 2.0f64.powf(layer.detune / 12.0);

            let sample = oscillator::waveform_sample(
                layer.wave,
                self.phases[i] + layer.phase_offset,
                &mut self.noise,
            );
            mixed += sample * layer.mix;

            self.phases[i] = oscillator::wrap_phase(self.phases[i] + detuned_increment);
        }

        if self.filter.kind() != FilterKind::None {
            mixed = self.filter.process(mixed);
        }

        mixed * gain * self.amplitude
    }
}
