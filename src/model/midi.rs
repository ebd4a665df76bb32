use crate::model::track::Track;
use crate::tempo::TempoMap;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded MIDI file: its tracks and the tempo map they share.
#[derive(Debug, Clone)]
pub struct Midi {
    source: Option<PathBuf>,
    tempo: Arc<TempoMap>,
    tracks: Vec<Track>,
}

impl Midi {
    pub fn new(source: Option<PathBuf>, tempo: Arc<TempoMap>, tracks: Vec<Track>) -> Self {
        Self {
            source,
            tempo,
            tracks,
        }
    }

    /// File the song was read from, `None` when it was parsed from memory.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.tempo.ticks_per_beat()
    }

    /// Tempo at the start of the song in beats per minute.
    pub fn tempo_bpm(&self) -> f64 {
        self.tempo.initial_bpm()
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track names in file order.
    pub fn list_tracks(&self) -> Vec<&str> {
        self.tracks.iter().map(Track::name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.name() == name)
    }

    /// Looks up a track by its exact name.
    pub fn track(&self, name: &str) -> Result<&Track> {
        self.get(name).ok_or_else(|| {
            anyhow!(
                "Track '{}' not found. Available tracks: {}",
                name,
                self.list_tracks().join(", ")
            )
        })
    }

    pub fn track_by_index(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or_else(|| match self.tracks.len() {
            0 => anyhow!("Track index {} out of range, the file has no tracks", index),
            len => anyhow!("Track index {} out of range (0-{})", index, len - 1),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::event::{ChannelEvent, TempoEvent};

    fn song() -> Midi {
        let tempo = Arc::new(TempoMap::new(480, &[TempoEvent::new(0, 600_000)]).unwrap());
        let tracks = vec![
            Track::new("Conductor", 0, Vec::new(), 0, Arc::clone(&tempo)),
            Track::new(
                "Piano",
                1,
                vec![ChannelEvent::note_on(0, 0, 60, 90)],
                480,
                Arc::clone(&tempo),
            ),
        ];
        Midi::new(None, tempo, tracks)
    }

    #[test]
    fn lookup_by_name_and_index() {
        let midi = song();

        assert_eq!(midi.list_tracks(), vec!["Conductor", "Piano"]);
        assert_eq!(midi.track("Piano").unwrap().index(), 1);
        assert_eq!(midi.track_by_index(0).unwrap().name(), "Conductor");
        assert!(midi.get("piano").is_none());
        assert_eq!(midi.ticks_per_beat(), 480);
        assert_eq!(midi.tempo_bpm(), 100.0);
        assert!(midi.source().is_none());
    }

    #[test]
    fn lookup_errors_are_descriptive() {
        let midi = song();

        let err = midi.track("Drums").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Track 'Drums' not found. Available tracks: Conductor, Piano"
        );

        let err = midi.track_by_index(2).unwrap_err();
        assert_eq!(err.to_string(), "Track index 2 out of range (0-1)");
    }
}
