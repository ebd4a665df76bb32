use crate::error::DecodeError;
use crate::grouping::{ToneGroups, emit_tone_groups};
use crate::model::event::ChannelEvent;
use crate::resolver::{first_program, primary_channel};
use crate::tempo::TempoMap;
use std::sync::Arc;

/// One track of a MIDI file.
///
/// Holds the raw channel events and a handle to the song's tempo map. Tones
/// are decoded again on every call to [`Track::tone_groups`].
#[derive(Debug, Clone)]
pub struct Track {
    name: String,
    index: usize,
    channel: u8,
    program: Option<u8>,
    events: Vec<ChannelEvent>,
    end_tick: u64,
    tempo: Arc<TempoMap>,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        events: Vec<ChannelEvent>,
        end_tick: u64,
        tempo: Arc<TempoMap>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            channel: primary_channel(&events).unwrap_or(0),
            program: first_program(&events),
            events,
            end_tick,
            tempo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the track in its file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Channel of the track's first voice event, 0 if it has none.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn program(&self) -> Option<u8> {
        self.program
    }

    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    pub fn events(&self) -> &[ChannelEvent] {
        &self.events
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo
    }

    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        self.tempo.ticks_to_seconds(tick)
    }

    pub fn tone_groups(&self) -> Result<ToneGroups<'_>, DecodeError> {
        emit_tone_groups(&self.events, &self.tempo, self.end_tick)
    }

    /// Seconds until the last tone stops sounding.
    pub fn duration(&self) -> Result<f64, DecodeError> {
        Ok(self
            .tone_groups()?
            .flat_map(|group| group.tones)
            .map(|tone| tone.end_time())
            .fold(0.0, f64::max))
    }

    pub fn tone_count(&self) -> Result<usize, DecodeError> {
        Ok(self.tone_groups()?.map(|group| group.len()).sum())
    }
}
