//! Lock-free ring buffer for audio streaming
//!
//! Single-producer / single-consumer queue of `f64` samples used on every
//! edge of the pipeline: voice → mixer, mixer → pedal stage, pedal stage →
//! device callback. Capacity is a power of two so positions can be wrapped
//! with a mask instead of a modulo.
//!
//! A ring is created once and then [`split`] into a [`RingProducer`] and a
//! [`RingConsumer`]; each half is `Send` and is moved onto the thread that
//! owns that side of the edge. The parent [`SpscRing`] handle keeps the
//! observer queries and [`reset`] for the controller.
//!
//! [`split`]: SpscRing::split
//! [`reset`]: SpscRing::reset

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared storage behind a ring and its two halves.
///
/// Positions grow monotonically and are wrapped with `mask` on access.
/// The producer publishes a slot with a release store of `write_pos`; the
/// consumer observes it with an acquire load (and symmetrically for
/// `read_pos`), so no locks are needed.
struct RingCore {
    buffer: Box<[UnsafeCell<f64>]>,
    mask: usize,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
}

// The UnsafeCell slots are only written through the single RingProducer
// and read through the single RingConsumer, with release/acquire pairs
// ordering the accesses.
unsafe impl Send for RingCore {}
unsafe impl Sync for RingCore {}

impl RingCore {
    fn available(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read) & self.mask
    }

    fn space(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        read.wrapping_sub(write).wrapping_sub(1) & self.mask
    }

    fn fill_ratio(&self) -> f64 {
        self.available() as f64 / (self.buffer.len() - 1) as f64
    }
}

/// Lock-free single-producer / single-consumer ring of `f64` samples.
///
/// This handle only observes the ring (and can [`reset`] it); writing and
/// reading happen through the halves returned by [`split`]. Call `split`
/// once per streaming session: a second call while earlier halves are
/// still alive would break the one-writer/one-reader contract.
///
/// [`split`]: SpscRing::split
/// [`reset`]: SpscRing::reset
pub struct SpscRing {
    core: Arc<RingCore>,
}

impl SpscRing {
    /// Create a ring with the given capacity (must be a power of two > 1).
    ///
    /// One slot is always kept free to distinguish full from empty, so the
    /// usable capacity is `capacity - 1` samples.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 1 && capacity.is_power_of_two(),
            "ring capacity must be a power of two, got {}",
            capacity
        );

        let buffer: Vec<UnsafeCell<f64>> = (0..capacity).map(|_| UnsafeCell::new(0.0)).collect();

        Self {
            core: Arc::new(RingCore {
                buffer: buffer.into_boxed_slice(),
                mask: capacity - 1,
                write_pos: AtomicUsize::new(0),
                read_pos: AtomicUsize::new(0),
            }),
        }
    }

    /// Hand out the write and read halves of this ring.
    pub fn split(&self) -> (RingProducer, RingConsumer) {
        (
            RingProducer {
                core: Arc::clone(&self.core),
            },
            RingConsumer {
                core: Arc::clone(&self.core),
            },
        )
    }

    /// Total number of slots (one of which is always kept free).
    pub fn capacity(&self) -> usize {
        self.core.buffer.len()
    }

    /// Number of samples ready to be read.
    pub fn available(&self) -> usize {
        self.core.available()
    }

    /// Number of samples that can still be written.
    pub fn space(&self) -> usize {
        self.core.space()
    }

    /// How full the ring is, in `[0, 1]`, relative to its usable capacity.
    pub fn fill_ratio(&self) -> f64 {
        self.core.fill_ratio()
    }

    /// True if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.core.available() == 0
    }

    /// Discard all buffered samples and rewind both positions.
    ///
    /// Only safe while neither half is mid-operation; the engine calls it
    /// when recycling an idle voice slot for a new note.
    pub fn reset(&self) {
        self.core.read_pos.store(0, Ordering::Release);
        self.core.write_pos.store(0, Ordering::Release);
    }
}

/// Write half of a ring; owned by the thread that produces samples.
pub struct RingProducer {
    core: Arc<RingCore>,
}

impl RingProducer {
    /// Write one sample. Returns `false` (without overwriting anything) if
    /// the ring is full.
    pub fn write_f64(&mut self, value: f64) -> bool {
        let write = self.core.write_pos.load(Ordering::Relaxed);
        let read = self.core.read_pos.load(Ordering::Acquire);

        if read.wrapping_sub(write).wrapping_sub(1) & self.core.mask == 0 {
            return false;
        }

        unsafe {
            *self.core.buffer[write & self.core.mask].get() = value;
        }
        self.core
            .write_pos
            .store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Number of samples that can still be written.
    pub fn space(&self) -> usize {
        self.core.space()
    }

    /// Number of samples ready on the read side.
    pub fn available(&self) -> usize {
        self.core.available()
    }

    /// How full the ring is; refill policies top it up below a threshold.
    pub fn fill_ratio(&self) -> f64 {
        self.core.fill_ratio()
    }
}

/// Read half of a ring; owned by the thread that consumes samples.
pub struct RingConsumer {
    core: Arc<RingCore>,
}

impl RingConsumer {
    /// Read one sample, or `0.0` if the ring is empty.
    pub fn read_f64(&mut self) -> f64 {
        let read = self.core.read_pos.load(Ordering::Relaxed);
        let write = self.core.write_pos.load(Ordering::Acquire);

        if write.wrapping_sub(read) & self.core.mask == 0 {
            return 0.0;
        }

        let value = unsafe { *self.core.buffer[read & self.core.mask].get() };
        self.core
            .read_pos
            .store(read.wrapping_add(1), Ordering::Release);
        value
    }

    /// Number of samples ready to be read.
    pub fn available(&self) -> usize {
        self.core.available()
    }

    /// Number of samples the write side can still push.
    pub fn space(&self) -> usize {
        self.core.space()
    }

    /// True if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.core.available() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_ring_reads_sentinel() {
        let ring = SpscRing::new(16);
        let (_writer, mut reader) = ring.split();
        assert!(ring.is_empty());
        assert_eq!(ring.available(), 0);
        assert_eq!(ring.space(), 15);
        assert_eq!(reader.read_f64(), 0.0);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let ring = SpscRing::new(8);
        let (mut writer, mut reader) = ring.split();
        assert!(writer.write_f64(1.5));
        assert!(writer.write_f64(-2.5));
        assert_eq!(ring.available(), 2);
        assert_eq!(reader.read_f64(), 1.5);
        assert_eq!(reader.read_f64(), -2.5);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_full_ring_rejects_writes() {
        let ring = SpscRing::new(4);
        let (mut writer, mut reader) = ring.split();
        assert!(writer.write_f64(1.0));
        assert!(writer.write_f64(2.0));
        assert!(writer.write_f64(3.0));
        // Only capacity - 1 slots are usable.
        assert!(!writer.write_f64(4.0));
        assert_eq!(ring.available(), 3);
        assert_eq!(writer.space(), 0);

        // Draining one sample frees exactly one slot.
        assert_eq!(reader.read_f64(), 1.0);
        assert!(writer.write_f64(4.0));
        assert!(!writer.write_f64(5.0));
    }

    #[test]
    fn test_fill_ratio() {
        let ring = SpscRing::new(8);
        let (mut writer, _reader) = ring.split();
        assert_eq!(ring.fill_ratio(), 0.0);
        for i in 0..7 {
            assert!(writer.write_f64(i as f64));
        }
        assert_eq!(ring.fill_ratio(), 1.0);
        assert_eq!(writer.fill_ratio(), 1.0);
    }

    #[test]
    fn test_reset_discards_samples() {
        let ring = SpscRing::new(8);
        let (mut writer, mut reader) = ring.split();
        writer.write_f64(1.0);
        writer.write_f64(2.0);
        ring.reset();
        assert!(ring.is_empty());
        assert_eq!(reader.read_f64(), 0.0);
    }

    #[test]
    fn test_positions_wrap_past_capacity() {
        let ring = SpscRing::new(4);
        let (mut writer, mut reader) = ring.split();
        // Push/pop far more samples than the capacity so the monotonic
        // positions wrap the mask many times.
        for i in 0..1000 {
            assert!(writer.write_f64(i as f64));
            assert_eq!(reader.read_f64(), i as f64);
        }
    }

    #[test]
    fn test_spsc_threaded_ordering() {
        const COUNT: usize = 1_000_000;
        let ring = SpscRing::new(1024);
        let capacity = ring.capacity();
        let (mut writer, mut reader) = ring.split();

        let producer = thread::spawn(move || {
            let mut next = 0usize;
            while next < COUNT {
                if writer.write_f64(next as f64) {
                    next += 1;
                }
                assert_eq!(writer.available() + writer.space() + 1, capacity);
            }
        });

        let mut expected = 0usize;
        while expected < COUNT {
            if !reader.is_empty() {
                // Every value arrives exactly once, in push order.
                assert_eq!(reader.read_f64(), expected as f64);
                expected += 1;
            }
            assert_eq!(reader.available() + reader.space() + 1, capacity);
        }

        producer.join().unwrap();
        assert!(reader.is_empty());
    }
}
