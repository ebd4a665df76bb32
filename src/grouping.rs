use crate::error::DecodeError;
use crate::model::event::ChannelEvent;
use crate::model::tone::{Tone, ToneGroup};
use crate::resolver::{RawNote, resolve_notes};
use crate::tempo::TempoMap;
use log::debug;
use std::iter::{FusedIterator, Peekable};
use std::vec;

/// Groups of simultaneous tones in start order.
///
/// Notes are paired and sorted up front; each call to `next` converts one
/// group to seconds. Nothing is cached, so decoding a track again builds a
/// fresh iterator with identical output.
#[derive(Debug, Clone)]
pub struct ToneGroups<'a> {
    tempo: &'a TempoMap,
    notes: Peekable<vec::IntoIter<RawNote>>,
    rejected: Vec<DecodeError>,
}

impl<'a> ToneGroups<'a> {
    /// Sorts `notes` by start tick, then pitch, and groups them by start tick.
    pub fn new(mut notes: Vec<RawNote>, tempo: &'a TempoMap) -> Self {
        // stable, so identical (tick, pitch) pairs keep their resolution order
        notes.sort_by_key(|note| (note.start_tick, note.pitch));

        Self {
            tempo,
            notes: notes.into_iter().peekable(),
            rejected: Vec::new(),
        }
    }

    /// Events skipped while resolving the notes behind these groups.
    pub fn rejected(&self) -> &[DecodeError] {
        &self.rejected
    }
}

impl Iterator for ToneGroups<'_> {
    type Item = ToneGroup;

    fn next(&mut self) -> Option<ToneGroup> {
        let first = self.notes.next()?;
        let start_tick = first.start_tick;
        let start_time = self.tempo.ticks_to_seconds(start_tick);

        let mut tones = vec![to_tone(self.tempo, &first, start_time)];
        while let Some(note) = self.notes.next_if(|note| note.start_tick == start_tick) {
            tones.push(to_tone(self.tempo, &note, start_time));
        }

        Some(ToneGroup {
            start_tick,
            start_time,
            tones,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.notes.len();
        (remaining.min(1), Some(remaining))
    }
}

impl FusedIterator for ToneGroups<'_> {}

fn to_tone(tempo: &TempoMap, note: &RawNote, start_time: f64) -> Tone {
    let end_time = tempo.ticks_to_seconds(note.end_tick);
    Tone::new(note.pitch, note.velocity, start_time, end_time - start_time)
}

/// Decodes one track's channel events into tone groups.
///
/// `end_tick` is where notes without a note-off are closed. See
/// [`resolve_notes`] for the pairing rules and error behavior.
pub fn emit_tone_groups<'a>(
    events: &[ChannelEvent],
    tempo: &'a TempoMap,
    end_tick: u64,
) -> Result<ToneGroups<'a>, DecodeError> {
    let resolution = resolve_notes(events, end_tick)?;

    debug!(
        "Resolved {} notes from {} events ({} rejected)",
        resolution.notes.len(),
        events.len(),
        resolution.rejected.len()
    );

    let mut groups = ToneGroups::new(resolution.notes, tempo);
    groups.rejected = resolution.rejected;
    Ok(groups)
}
