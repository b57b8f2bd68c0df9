//! Note events and the MIDI pitch table

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Frequencies for all 128 MIDI notes, equal temperament around A4 = 440 Hz.
static NOTE_FREQUENCIES: Lazy<[f64; 128]> = Lazy::new(|| {
    let mut table = [0.0f64; 128];
    for (i, freq) in table.iter_mut().enumerate() {
        *freq = 440.0 * 2.0_f64.powf((i as f64 - 69.0) / 12.0);
    }
    table
});

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Frequency of a MIDI note, or 0.0 when the note is out of range.
pub fn midi_to_frequency(midi_note: i32) -> f64 {
    if !(0..=127).contains(&midi_note) {
        return 0.0;
    }
    NOTE_FREQUENCIES[midi_note as usize]
}

/// Nearest MIDI note for a frequency, or `None` for non-positive input.
pub fn frequency_to_midi(frequency: f64) -> Option<i32> {
    if frequency <= 0.0 {
        return None;
    }
    let note = 69.0 + 12.0 * (frequency / 440.0).log2();
    Some((note + 0.5).floor() as i32)
}

/// Display name of a MIDI note, e.g. `69` → "A4".
pub fn midi_note_name(midi_note: i32) -> String {
    if !(0..=127).contains(&midi_note) {
        return "Invalid".to_string();
    }
    let octave = midi_note / 12 - 1;
    let index = (midi_note % 12) as usize;
    format!("{}{}", NOTE_NAMES[index], octave)
}

/// How a note's lifetime is controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// The voice ends itself after `duration_ms`.
    Duration,
    /// The voice sustains until an explicit `end_note`.
    Manual,
}

/// Parameters of a single note event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoteCfg {
    /// MIDI note number, 0-127.
    pub midi_note: i32,
    /// Note length in milliseconds; only meaningful in duration mode.
    pub duration_ms: i32,
    /// Linear gain in [0, 1].
    pub amplitude: f64,
    /// Stereo position in [0, 1]: 0 = left, 1 = right, 0.5 = center.
    pub pan: f64,
    /// Playing strength in [0, 1]. Carried for future use; the DSP path
    /// does not modulate by it.
    pub velocity: f64,
}

impl NoteCfg {
    pub fn new(midi_note: i32) -> Self {
        Self {
            midi_note,
            duration_ms: 0,
            amplitude: 1.0,
            pan: 0.5,
            velocity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_440() {
        assert!((midi_to_frequency(69) - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_octave_doubles_frequency() {
        let a4 = midi_to_frequency(69);
        let a5 = midi_to_frequency(81);
        assert!((a5 / a4 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_notes() {
        assert_eq!(midi_to_frequency(-1), 0.0);
        assert_eq!(midi_to_frequency(128), 0.0);
    }

    #[test]
    fn test_frequency_to_midi_roundtrip() {
        for note in [0, 21, 60, 69, 127] {
            let freq = midi_to_frequency(note);
            assert_eq!(frequency_to_midi(freq), Some(note));
        }
        assert_eq!(frequency_to_midi(0.0), None);
        assert_eq!(frequency_to_midi(-10.0), None);
    }

    #[test]
    fn test_note_names() {
        assert_eq!(midi_note_name(60), "C4");
        assert_eq!(midi_note_name(69), "A4");
        assert_eq!(midi_note_name(-1), "Invalid");
    }
}
