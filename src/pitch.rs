//! Conversions from MIDI note numbers to frequencies and note names.
//!
//! Note classes are counted from A (A = 0, A# = 1, ... G# = 11) and spelled
//! with sharps only.

const A4_MIDI: i32 = 69;
const A4_HZ: f64 = 440.0;
const A0_MIDI: i32 = 21;

pub const NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Equal-tempered frequency in Hz, tuned to A4 = 440 Hz.
pub fn frequency(midi_note: u8) -> f64 {
    A4_HZ * 2f64.powf(f64::from(i32::from(midi_note) - A4_MIDI) / 12.0)
}

/// Semitone class relative to A, in `0..12`.
pub fn note_int(midi_note: u8) -> u8 {
    (i32::from(midi_note) - A0_MIDI).rem_euclid(12) as u8
}

pub fn note_name(midi_note: u8) -> &'static str {
    NOTE_NAMES[note_int(midi_note) as usize]
}

/// Octave number in scientific pitch notation (MIDI 60 is in octave 4).
pub fn octave(midi_note: u8) -> i32 {
    (i32::from(midi_note) - 12).div_euclid(12)
}

/// Note name with octave, e.g. `"C4"` or `"A#0"`.
pub fn note_full(midi_note: u8) -> String {
    format!("{}{}", note_name(midi_note), octave(midi_note))
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 0.01
    }

    #[test]
    fn reference_frequencies() {
        assert_eq!(frequency(69), 440.0);
        assert_eq!(frequency(81), 880.0);
        assert_eq!(frequency(57), 220.0);
        assert!(approx_eq(frequency(60), 261.63));
        assert!(approx_eq(frequency(21), 27.5));
    }

    #[test]
    fn frequency_rises_with_pitch() {
        for n in 0..127u8 {
            assert!(frequency(n) < frequency(n + 1));
        }
    }

    #[test]
    fn note_classes_are_a_relative() {
        assert_eq!(note_int(21), 0);
        assert_eq!(note_int(69), 0);
        assert_eq!(note_int(0), 3);
        assert_eq!(note_int(60), 3);
        assert_eq!(note_int(20), 11);
        assert!((0..=127u8).all(|n| note_int(n) < 12));
    }

    #[test]
    fn note_names() {
        assert_eq!(note_name(0), "C");
        assert_eq!(note_name(61), "C#");
        assert_eq!(note_name(70), "A#");
        assert_eq!(note_name(68), "G#");
    }

    #[test]
    fn full_names() {
        assert_eq!(note_full(60), "C4");
        assert_eq!(note_full(69), "A4");
        assert_eq!(note_full(21), "A0");
        assert_eq!(note_full(127), "G9");
        assert_eq!(note_full(0), "C-1");
        assert_eq!(note_full(11), "B-1");
        assert_eq!(note_full(12), "C0");
        assert_eq!(note_full(73), "C#5");
    }
}
