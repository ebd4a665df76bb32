use crate::pitch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single resolved note.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tone {
    pub midi_note: u8,
    pub velocity: u8,
    /// Seconds from the start of the song.
    pub start_time: f64,
    /// Seconds.
    pub duration: f64,
    /// Hz, A4 = 440.
    pub frequency: f64,
    /// Semitone relative to A (A = 0 .. G# = 11).
    pub note_int: u8,
    pub note_name: String,
    pub note_full: String,
}

impl Tone {
    pub fn new(midi_note: u8, velocity: u8, start_time: f64, duration: f64) -> Self {
        Self {
            midi_note,
            velocity,
            start_time,
            duration,
            frequency: pitch::frequency(midi_note),
            note_int: pitch::note_int(midi_note),
            note_name: pitch::note_name(midi_note).to_string(),
            note_full: pitch::note_full(midi_note),
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2} Hz) - {:.1}s",
            self.note_full, self.frequency, self.duration
        )
    }
}

/// Tones that start on the same tick, lowest pitch first. Never empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToneGroup {
    pub start_tick: u64,
    pub start_time: f64,
    pub tones: Vec<Tone>,
}

impl ToneGroup {
    pub fn len(&self) -> usize {
        self.tones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    pub fn is_chord(&self) -> bool {
        self.tones.len() > 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tone> {
        self.tones.iter()
    }

    pub fn midi_notes(&self) -> Vec<u8> {
        self.tones.iter().map(|tone| tone.midi_note).collect()
    }
}

impl<'a> IntoIterator for &'a ToneGroup {
    type Item = &'a Tone;
    type IntoIter = std::slice::Iter<'a, Tone>;

    fn into_iter(self) -> Self::IntoIter {
        self.tones.iter()
    }
}
