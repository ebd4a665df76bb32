use crate::model::midi::Midi;
use crate::model::track::Track;
use anyhow::{Result, bail};
use log::info;

/// Finds a track by exact name, falling back to a zero-based index.
pub fn select_track<'a>(midi: &'a Midi, selector: &str) -> Result<&'a Track> {
    if let Some(track) = midi.get(selector) {
        return Ok(track);
    }

    match selector.trim().parse::<usize>() {
        Ok(index) => midi.track_by_index(index),
        Err(_) => midi.track(selector),
    }
}

/// The first track that has any channel events, else the first track.
pub fn default_track(midi: &Midi) -> Result<&Track> {
    let Some(first) = midi.tracks().first() else {
        bail!("MIDI file contains no tracks..!");
    };

    let track = midi
        .tracks()
        .iter()
        .find(|track| !track.events().is_empty())
        .unwrap_or(first);

    if track.index() != 0 {
        info!(
            "No track given, defaulting to '{}' (index {})..!",
            track.name(),
            track.index()
        );
    }

    Ok(track)
}
