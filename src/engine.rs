//! Synthesizer controller and worker tiers
//!
//! The controller owns the voice slots, the pedal chain and the staged
//! rings, and runs three worker tiers between the note API and the device
//! callback:
//!
//! 1. Voice producers (one thread per slot) synthesize samples into each
//!    voice's ring.
//! 2. The mix worker drains every active voice, applies panning, and
//!    writes interleaved stereo pairs into the mix ring.
//! 3. The pedal worker pulls pairs from the mix ring, runs them through
//!    the pedal chain (an empty chain is an identity stage) and fills the
//!    output ring the device callback reads from.
//!
//! The callback itself only reads the output ring, applies master volume,
//! clamps and converts to s16; it never allocates or takes a lock.

use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{
    AudioConfig, MAX_SAMPLE_RATE, MAX_VOICES, MIN_SAMPLE_RATE, MIX_REFILL_CHUNK,
    MIX_REFILL_THRESHOLD, MIX_RING_SIZE, PEDAL_REFILL_CHUNK, PEDAL_RING_SIZE,
    RECENT_SAMPLE_SIZE, VOICE_REFILL_CHUNK, VOICE_REFILL_THRESHOLD, VOICE_RING_SIZE,
};
use crate::device::{DeviceState, OutputDevice};
use crate::error::{self, ErrorKind, SynthError};
use crate::instruments::{self, InstrumentKind};
use crate::note::{self, ControlMode, NoteCfg};
use crate::pedal::{Pedal, PedalChain, PedalInfo, PedalKind};
use crate::ring::{RingConsumer, RingProducer, SpscRing};
use crate::tone::Tone;
use crate::voice::{VoiceDsp, VoiceSlot};

/// How long the poll-sleep worker tiers rest between wake-ups.
const WORKER_TICK: Duration = Duration::from_millis(1);

/// State shared between the controller, the worker tiers and the device
/// callback.
pub(crate) struct EngineShared {
    pub(crate) config: AudioConfig,
    delta_time: f64,

    voices: Vec<VoiceSlot>,
    chain: RwLock<PedalChain>,
    mix_ring: SpscRing,
    pedal_ring: SpscRing,

    // Control values written by the controller, read by workers and the
    // callback; relaxed atomics are enough for these single-writer fields.
    master_volume_bits: AtomicU64,

    // Telemetry
    samples_played: AtomicU64,
    stall_ms: AtomicU64,
    last_error: AtomicU8,
    device_state: AtomicU8,
    recent_samples: Box<[AtomicI16]>,
    recent_write_pos: AtomicUsize,

    // Worker lifecycle flags; workers observe these and exit at the next
    // poll.
    voice_workers_running: AtomicBool,
    mix_worker_running: AtomicBool,
    pedal_worker_running: AtomicBool,
}

impl EngineShared {
    fn new(config: AudioConfig) -> Self {
        let delta_time = config.delta_time();
        let recent: Vec<AtomicI16> = (0..RECENT_SAMPLE_SIZE).map(|_| AtomicI16::new(0)).collect();

        Self {
            delta_time,
            voices: (0..MAX_VOICES).map(VoiceSlot::new).collect(),
            chain: RwLock::new(PedalChain::new()),
            mix_ring: SpscRing::new(MIX_RING_SIZE),
            pedal_ring: SpscRing::new(PEDAL_RING_SIZE),
            master_volume_bits: AtomicU64::new(0.5f64.to_bits()),
            samples_played: AtomicU64::new(0),
            stall_ms: AtomicU64::new(0),
            last_error: AtomicU8::new(ErrorKind::None as u8),
            device_state: AtomicU8::new(DeviceState::Uninit as u8),
            recent_samples: recent.into_boxed_slice(),
            recent_write_pos: AtomicUsize::new(0),
            voice_workers_running: AtomicBool::new(false),
            mix_worker_running: AtomicBool::new(false),
            pedal_worker_running: AtomicBool::new(false),
            config,
        }
    }

    fn master_volume(&self) -> f64 {
        f64::from_bits(self.master_volume_bits.load(Ordering::Relaxed))
    }

    fn device_state(&self) -> DeviceState {
        DeviceState::from_code(self.device_state.load(Ordering::Relaxed))
    }

    fn set_device_state(&self, state: DeviceState) {
        self.device_state.store(state as u8, Ordering::Relaxed);
    }

    /// Fill an interleaved stereo s16 buffer from the output ring's
    /// consumer half. This is the body of the device callback; tests drive
    /// it directly with the half returned by `spawn_workers`.
    pub(crate) fn render_frames(&self, output_reader: &mut RingConsumer, output: &mut [i16]) {
        let master_volume = self.master_volume();

        for frame in output.chunks_exact_mut(2) {
            let (left, right) = self.next_output_pair(output_reader);

            let left = (left * master_volume).clamp(-1.0, 1.0);
            let right = (right * master_volume).clamp(-1.0, 1.0);

            let left_s16 = (left * 32767.0) as i16;
            let right_s16 = (right * 32767.0) as i16;

            frame[0] = left_s16;
            frame[1] = right_s16;

            if left_s16 != 0 || right_s16 != 0 {
                self.samples_played.fetch_add(1, Ordering::Relaxed);
            }

            self.push_recent(left_s16);
            self.push_recent(right_s16);
        }
    }

    /// Pull the next stereo pair from the output ring. On starvation the
    /// callback spins while the pedal worker is alive (attributed to stall
    /// telemetry) and substitutes silence once it is not.
    fn next_output_pair(&self, output_reader: &mut RingConsumer) -> (f64, f64) {
        if output_reader.available() >= 2 {
            return (output_reader.read_f64(), output_reader.read_f64());
        }
        if !self.pedal_worker_running.load(Ordering::Relaxed) {
            return (0.0, 0.0);
        }

        let wait_start = Instant::now();
        loop {
            if output_reader.available() >= 2 {
                self.stall_ms
                    .fetch_add(wait_start.elapsed().as_millis() as u64, Ordering::Relaxed);
                return (output_reader.read_f64(), output_reader.read_f64());
            }
            if !self.pedal_worker_running.load(Ordering::Relaxed) {
                self.stall_ms
                    .fetch_add(wait_start.elapsed().as_millis() as u64, Ordering::Relaxed);
                return (0.0, 0.0);
            }
            std::hint::spin_loop();
        }
    }

    fn push_recent(&self, sample: i16) {
        let pos = self.recent_write_pos.load(Ordering::Relaxed);
        self.recent_samples[pos & (RECENT_SAMPLE_SIZE - 1)].store(sample, Ordering::Relaxed);
        self.recent_write_pos.store(pos.wrapping_add(1), Ordering::Relaxed);
    }

    /// Copy of the recent-output window, oldest sample first.
    fn recent_snapshot(&self) -> Vec<i16> {
        let pos = self.recent_write_pos.load(Ordering::Relaxed);
        (0..RECENT_SAMPLE_SIZE)
            .map(|i| self.recent_samples[(pos + i) & (RECENT_SAMPLE_SIZE - 1)].load(Ordering::Relaxed))
            .collect()
    }

    /// Mix one stereo frame from all active voices, reading through the
    /// mixer-owned consumer halves (slot order). If an active voice's ring
    /// is momentarily empty the mixer waits for its producer (counted as
    /// stall latency), bailing out if the voice is reclaimed or the engine
    /// is stopping.
    fn mix_one_frame(&self, voice_readers: &mut [RingConsumer]) -> (f64, f64) {
        let mut left = 0.0;
        let mut right = 0.0;

        for (slot, reader) in self.voices.iter().zip(voice_readers.iter_mut()) {
            if !slot.is_active() {
                continue;
            }

            let mut wait_start: Option<Instant> = None;
            let sample = loop {
                if !reader.is_empty() {
                    break Some(reader.read_f64());
                }
                if !slot.is_active() {
                    break None;
                }
                if !self.mix_worker_running.load(Ordering::Relaxed) {
                    break None;
                }
                wait_start.get_or_insert_with(Instant::now);
                std::hint::spin_loop();
            };

            if let Some(started) = wait_start {
                self.stall_ms
                    .fetch_add(started.elapsed().as_millis() as u64, Ordering::Relaxed);
            }

            if let Some(sample) = sample {
                let pan = slot.pan();
                left += sample * (1.0 - pan);
                right += sample * pan;
            }
        }

        (left, right)
    }
}

/// Voice producer tier: synthesize samples for one slot whenever its ring
/// drops below the refill threshold. Owns the write half of the slot's
/// ring for the lifetime of the worker session.
fn voice_producer(shared: Arc<EngineShared>, index: usize, mut ring_writer: RingProducer) {
    let slot = &shared.voices[index];
    let delta_time = shared.delta_time;
    let sample_rate = shared.config.sample_rate;

    let mut dsp: Option<VoiceDsp> = None;
    let mut generation = 0u64;

    while shared.voice_workers_running.load(Ordering::Acquire) {
        if slot.is_active() {
            let current = slot.generation();
            if dsp.is_none() || generation != current {
                generation = current;
                dsp = slot
                    .note_snapshot()
                    .map(|voice_note| VoiceDsp::new(&voice_note, sample_rate));
            }

            let mut finished = false;
            if let Some(state) = dsp.as_mut() {
                if ring_writer.fill_ratio() <= VOICE_REFILL_THRESHOLD {
                    let mut produced = 0;
                    while ring_writer.space() > 0 && produced < VOICE_REFILL_CHUNK {
                        if slot.is_ended() {
                            state.release();
                        }
                        if !ring_writer.write_f64(state.step(delta_time)) {
                            break;
                        }
                        produced += 1;

                        if state.is_finished() {
                            // Envelope ran out; reclaim the slot. The mixer
                            // stops reading the moment it observes this.
                            slot.deactivate();
                            finished = true;
                            break;
                        }
                    }
                }
            }
            if finished {
                dsp = None;
            }
        } else if dsp.is_some() {
            dsp = None;
        }

        thread::sleep(WORKER_TICK);
    }
}

/// Mix tier: fold every active voice into stereo pairs. Owns the read
/// halves of all voice rings (slot order) and the write half of the mix
/// ring.
fn mix_worker(
    shared: Arc<EngineShared>,
    mut voice_readers: Vec<RingConsumer>,
    mut mix_writer: RingProducer,
) {
    while shared.mix_worker_running.load(Ordering::Acquire) {
        if mix_writer.fill_ratio() <= MIX_REFILL_THRESHOLD {
            let mut written = 0;
            while mix_writer.space() >= 2 && written < MIX_REFILL_CHUNK {
                let (left, right) = shared.mix_one_frame(&mut voice_readers);
                mix_writer.write_f64(left);
                mix_writer.write_f64(right);
                written += 2;
            }
        }
        thread::sleep(WORKER_TICK);
    }
}

/// Pedal tier: run mixed pairs through the chain into the output ring.
/// Owns the read half of the mix ring and the write half of the output
/// ring. The chain lock is held only while a batch is processed;
/// controller mutations interleave between batches.
fn pedal_worker(
    shared: Arc<EngineShared>,
    mut mix_reader: RingConsumer,
    mut pedal_writer: RingProducer,
) {
    while shared.pedal_worker_running.load(Ordering::Acquire) {
        if pedal_writer.space() >= 2 && mix_reader.available() >= 2 {
            let mut chain = shared.chain.write();
            let mut processed = 0;
            while processed < PEDAL_REFILL_CHUNK
                && pedal_writer.space() >= 2
                && mix_reader.available() >= 2
            {
                let left = mix_reader.read_f64();
                let right = mix_reader.read_f64();
                let (left, right) = chain.process_pair(left, right);
                pedal_writer.write_f64(left);
                pedal_writer.write_f64(right);
                processed += 2;
            }
        }
        thread::sleep(WORKER_TICK);
    }
}

/// Telemetry snapshot returned by [`Synthesizer::stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthStats {
    pub buffer_frames: u32,
    pub voice_ring_capacity: usize,
    pub max_voices: usize,
    pub active_voices: usize,
    pub samples_played: u64,
    pub stall_latency_ms: u64,
    /// Most recent output samples (interleaved, oldest first).
    pub recent_samples: Vec<i16>,
    pub recent_sample_capacity: usize,
    pub device_state: DeviceState,
    pub last_error: ErrorKind,
}

/// The polyphonic synthesizer.
///
/// Construct with [`Synthesizer::new`], add notes with
/// [`Synthesizer::play_note`] / [`Synthesizer::end_note`], and shape the
/// output with the pedal-chain surface. [`Synthesizer::start`] opens the
/// output device and launches the worker tiers; [`Synthesizer::stop`]
/// tears them down again.
pub struct Synthesizer {
    shared: Arc<EngineShared>,
    workers: Vec<JoinHandle<()>>,
    device: Option<OutputDevice>,
    initialized: bool,
    running: bool,
}

impl Synthesizer {
    /// Validate the configuration and build an idle engine.
    pub fn new(config: AudioConfig) -> Result<Self, SynthError> {
        Self::precheck(&config)?;

        log::info!(
            "Synthesizer initialized: {:.1} Hz, {} channels, {} voices",
            config.sample_rate,
            config.channels,
            MAX_VOICES
        );

        Ok(Self {
            shared: Arc::new(EngineShared::new(config)),
            workers: Vec::new(),
            device: None,
            initialized: true,
            running: false,
        })
    }

    fn precheck(config: &AudioConfig) -> Result<(), SynthError> {
        for (name, size) in [
            ("voice", VOICE_RING_SIZE),
            ("mix", MIX_RING_SIZE),
            ("pedal", PEDAL_RING_SIZE),
        ] {
            if size < 2 || !size.is_power_of_two() {
                return Err(error::record(SynthError::Config(format!(
                    "{} ring capacity must be a power of two, got {}",
                    name, size
                ))));
            }
        }

        if config.channels != 2 {
            log::error!("Only 2-channel output is supported, got {}", config.channels);
            return Err(error::record(SynthError::Unsupport));
        }

        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&config.sample_rate) {
            log::error!(
                "Sample rate must be between {}Hz and {}Hz, got {}",
                MIN_SAMPLE_RATE,
                MAX_SAMPLE_RATE,
                config.sample_rate
            );
            return Err(error::record(SynthError::Config(format!(
                "sample rate {} out of range",
                config.sample_rate
            ))));
        }

        Ok(())
    }

    /// Record an error both on this controller and in the process-wide
    /// slot, then hand it back for returning.
    fn fail(&self, err: SynthError) -> SynthError {
        self.shared
            .last_error
            .store(err.kind() as u8, Ordering::Relaxed);
        error::record(err)
    }

    pub fn config(&self) -> &AudioConfig {
        &self.shared.config
    }

    /// Open the output device and launch the worker tiers.
    pub fn start(&mut self) -> Result<(), SynthError> {
        if !self.initialized {
            return Err(self.fail(SynthError::Uninit));
        }
        if self.running {
            return Ok(());
        }

        self.shared.set_device_state(DeviceState::Starting);
        let output_reader = match self.spawn_workers() {
            Ok(reader) => reader,
            Err(err) => {
                self.shared.set_device_state(DeviceState::Stopped);
                return Err(err);
            }
        };

        let device = match OutputDevice::open(
            Arc::clone(&self.shared),
            &self.shared.config,
            None,
            output_reader,
        ) {
            Ok(device) => device,
            Err(msg) => {
                self.halt_workers();
                self.shared.set_device_state(DeviceState::Stopped);
                return Err(self.fail(SynthError::Device(msg)));
            }
        };

        self.device = Some(device);
        self.shared.set_device_state(DeviceState::Started);
        self.running = true;
        log::info!("Audio playback started");
        Ok(())
    }

    /// Stop the device, signal the workers and join them.
    pub fn stop(&mut self) {
        if self.device.is_none() && self.workers.is_empty() {
            return;
        }

        self.shared.set_device_state(DeviceState::Stopping);
        self.device = None;
        self.halt_workers();
        self.shared.set_device_state(DeviceState::Stopped);
        self.running = false;
        log::info!("Audio playback stopped");
    }

    /// Stop if running, drop all pedals and reclaim every voice. The
    /// controller must be rebuilt before further use.
    pub fn cleanup(&mut self) {
        self.stop();
        self.shared.chain.write().clear();
        for slot in &self.shared.voices {
            slot.force_idle();
        }
        self.shared.set_device_state(DeviceState::Uninit);
        self.initialized = false;
        log::info!("Synthesizer cleaned up");
    }

    /// Split every ring for this session, launch the worker tiers with
    /// their halves, and hand back the output ring's consumer half for
    /// whoever renders (the device callback, or the tests).
    fn spawn_workers(&mut self) -> Result<RingConsumer, SynthError> {
        self.shared.voice_workers_running.store(true, Ordering::Release);
        self.shared.mix_worker_running.store(true, Ordering::Release);
        self.shared.pedal_worker_running.store(true, Ordering::Release);

        let (mix_writer, mix_reader) = self.shared.mix_ring.split();
        let (pedal_writer, output_reader) = self.shared.pedal_ring.split();

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(MAX_VOICES + 2);
        let mut voice_readers: Vec<RingConsumer> = Vec::with_capacity(MAX_VOICES);

        for index in 0..MAX_VOICES {
            let (voice_writer, voice_reader) = self.shared.voices[index].ring.split();
            voice_readers.push(voice_reader);

            let shared = Arc::clone(&self.shared);
            match thread::Builder::new()
                .name(format!("voice-producer-{}", index))
                .spawn(move || voice_producer(shared, index, voice_writer))
            {
                Ok(handle) => handles.push(handle),
                Err(err) => return Err(self.rollback_workers(handles, &err.to_string())),
            }
        }

        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name("mix-worker".to_string())
            .spawn(move || mix_worker(shared, voice_readers, mix_writer))
        {
            Ok(handle) => handles.push(handle),
            Err(err) => return Err(self.rollback_workers(handles, &err.to_string())),
        }

        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name("pedal-worker".to_string())
            .spawn(move || pedal_worker(shared, mix_reader, pedal_writer))
        {
            Ok(handle) => handles.push(handle),
            Err(err) => return Err(self.rollback_workers(handles, &err.to_string())),
        }

        log::info!(
            "Worker threads started ({} voice producers + mixer + pedal stage)",
            MAX_VOICES
        );
        self.workers = handles;
        Ok(output_reader)
    }

    fn rollback_workers(&self, handles: Vec<JoinHandle<()>>, msg: &str) -> SynthError {
        self.shared
            .voice_workers_running
            .store(false, Ordering::Release);
        self.shared.mix_worker_running.store(false, Ordering::Release);
        self.shared
            .pedal_worker_running
            .store(false, Ordering::Release);
        for handle in handles {
            let _ = handle.join();
        }
        log::error!("Failed to spawn worker thread: {}", msg);
        self.fail(SynthError::Worker(msg.to_string()))
    }

    fn halt_workers(&mut self) {
        self.shared
            .voice_workers_running
            .store(false, Ordering::Release);
        self.shared.mix_worker_running.store(false, Ordering::Release);
        self.shared
            .pedal_worker_running
            .store(false, Ordering::Release);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Dispatch a note on the first idle voice slot and return its index.
    pub fn play_note(
        &self,
        instrument: InstrumentKind,
        control_mode: ControlMode,
        cfg: &NoteCfg,
    ) -> Result<usize, SynthError> {
        if !self.initialized {
            return Err(self.fail(SynthError::Uninit));
        }
        if !(0..=127).contains(&cfg.midi_note) {
            return Err(self.fail(SynthError::NoteCfg));
        }

        let tone = &instruments::signature(instrument).tone;
        self.start_voice(tone, control_mode, cfg)
    }

    fn start_voice(
        &self,
        tone: &'static Tone,
        control_mode: ControlMode,
        cfg: &NoteCfg,
    ) -> Result<usize, SynthError> {
        let frequency = note::midi_to_frequency(cfg.midi_note);

        for (index, slot) in self.shared.voices.iter().enumerate() {
            if slot.is_active() {
                continue;
            }

            slot.start(
                tone,
                frequency,
                cfg.amplitude,
                cfg.pan,
                cfg.duration_ms,
                control_mode,
            );
            log::info!(
                "Started voice {}: note={}, freq={:.2}, amp={:.2}",
                index,
                cfg.midi_note,
                frequency,
                cfg.amplitude
            );
            return Ok(index);
        }

        log::warn!("Voice unavailable, all {} slots in use", MAX_VOICES);
        Err(self.fail(SynthError::VoiceUnavailable))
    }

    /// Note-off for a voice returned by [`Synthesizer::play_note`].
    /// Idempotent; a stale or out-of-range id is ignored.
    pub fn end_note(&self, voice_id: usize) {
        if let Some(slot) = self.shared.voices.get(voice_id) {
            slot.end();
        }
    }

    /// Set the master volume. Out-of-range values are rejected and leave
    /// the current volume in place.
    pub fn set_master_volume(&self, volume: f64) -> Result<f64, SynthError> {
        if !(0.0..=1.0).contains(&volume) {
            log::warn!("Master volume {} out of range, keeping current", volume);
            return Err(self.fail(SynthError::NoteCfg));
        }
        self.shared
            .master_volume_bits
            .store(volume.to_bits(), Ordering::Relaxed);
        log::info!("Master volume set to {:.2}", volume);
        Ok(volume)
    }

    pub fn master_volume(&self) -> f64 {
        self.shared.master_volume()
    }

    // Pedal chain surface. Index-taking operations return a failure flag
    // instead of an error: an invalid index is a no-op, never UB.

    /// Append a pedal and return its chain index.
    pub fn pedal_append(&self, kind: PedalKind) -> usize {
        let pedal = Pedal::new(kind, self.shared.config.sample_rate);
        let index = self.shared.chain.write().append(pedal);
        log::info!("Pedal appended: {:?} at index {}", kind, index);
        index
    }

    /// Insert a pedal at `idx`, shifting later pedals right.
    pub fn pedal_insert(&self, idx: usize, kind: PedalKind) -> bool {
        let pedal = Pedal::new(kind, self.shared.config.sample_rate);
        let inserted = self.shared.chain.write().insert(idx, pedal);
        if inserted {
            log::info!("Pedal inserted: {:?} at index {}", kind, idx);
        }
        inserted
    }

    pub fn pedal_remove(&self, idx: usize) -> bool {
        let removed = self.shared.chain.write().remove(idx);
        if removed {
            log::info!("Pedal removed at index {}", idx);
        }
        removed
    }

    pub fn pedal_swap(&self, idx1: usize, idx2: usize) -> bool {
        self.shared.chain.write().swap(idx1, idx2)
    }

    pub fn pedal_count(&self) -> usize {
        self.shared.chain.read().len()
    }

    /// Snapshot of the pedal at `idx`.
    pub fn pedal_get(&self, idx: usize) -> Option<PedalInfo> {
        self.shared.chain.read().get(idx).map(|pedal| pedal.info())
    }

    pub fn pedal_set_param(&self, idx: usize, param_idx: usize, value: f64) -> bool {
        match self.shared.chain.write().get_mut(idx) {
            Some(pedal) => pedal.set_param(param_idx, value),
            None => false,
        }
    }

    /// Flip a pedal's bypass flag. The flag itself is an atomic, so a read
    /// lock is enough to reach the pedal.
    pub fn pedal_set_bypass(&self, idx: usize, bypass: bool) -> bool {
        match self.shared.chain.read().get(idx) {
            Some(pedal) => {
                pedal.set_bypass(bypass);
                true
            }
            None => false,
        }
    }

    pub fn pedal_is_bypass(&self, idx: usize) -> Option<bool> {
        self.shared.chain.read().get(idx).map(|pedal| pedal.is_bypass())
    }

    /// Kind of the most recent error on this controller.
    pub fn last_error(&self) -> ErrorKind {
        ErrorKind::from_code(self.shared.last_error.load(Ordering::Relaxed))
    }

    /// Telemetry snapshot.
    pub fn stats(&self) -> SynthStats {
        let shared = &self.shared;
        SynthStats {
            buffer_frames: shared.config.buffer_size,
            voice_ring_capacity: VOICE_RING_SIZE,
            max_voices: MAX_VOICES,
            active_voices: shared.voices.iter().filter(|slot| slot.is_active()).count(),
            samples_played: shared.samples_played.load(Ordering::Relaxed),
            stall_latency_ms: shared.stall_ms.load(Ordering::Relaxed),
            recent_samples: shared.recent_snapshot(),
            recent_sample_capacity: RECENT_SAMPLE_SIZE,
            device_state: shared.device_state(),
            last_error: ErrorKind::from_code(shared.last_error.load(Ordering::Relaxed)),
        }
    }

    /// Render directly from the output ring (the device callback body);
    /// used by the tests to pull audio without a physical device.
    #[cfg(test)]
    pub(crate) fn render_frames(&self, output_reader: &mut RingConsumer, output: &mut [i16]) {
        self.shared.render_frames(output_reader, output);
    }
}

impl Drop for Synthesizer {
    fn drop(&mut self) {
        self.stop();
    }
}
