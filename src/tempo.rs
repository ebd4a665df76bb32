use crate::error::{DecodeError, Stream};
use crate::model::event::{DEFAULT_MICROS_PER_BEAT, TempoEvent};
use log::debug;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoBreakpoint {
    pub tick: u64,
    pub micros_per_beat: u32,
    seconds_at_start: f64,
}

impl TempoBreakpoint {
    /// Seconds elapsed from tick 0 up to this breakpoint.
    pub fn seconds(&self) -> f64 {
        self.seconds_at_start
    }
}

/// Piecewise-constant tempo timeline for a whole song.
///
/// Always holds a breakpoint at tick 0 and is immutable once built, so a
/// single map can be shared between tracks (and threads) behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    ticks_per_beat: u32,
    breakpoints: Vec<TempoBreakpoint>,
}

impl TempoMap {
    /// Builds the map from one tempo event stream per track.
    ///
    /// Each track's events must be in tick order. Events are merged across
    /// tracks and when several land on the same tick the last one in stream
    /// order (track order, then position) wins. Error indices count events
    /// across all tracks in that same order.
    pub fn from_tracks<T: AsRef<[TempoEvent]>>(
        ticks_per_beat: u32,
        tracks: &[T],
    ) -> Result<Self, DecodeError> {
        if ticks_per_beat == 0 {
            return Err(DecodeError::InvalidTicksPerBeat);
        }

        let mut merged: Vec<TempoEvent> = Vec::new();
        let mut index = 0;
        for track in tracks.iter() {
            let mut previous = 0u64;
            for event in track.as_ref() {
                if event.tick < previous {
                    return Err(DecodeError::MalformedEventOrder {
                        stream: Stream::Tempo,
                        index,
                        tick: event.tick,
                        previous,
                    });
                }
                if event.micros_per_beat == 0 {
                    return Err(DecodeError::InvalidTempo {
                        index,
                        tick: event.tick,
                    });
                }

                previous = event.tick;
                merged.push(*event);
                index += 1;
            }
        }

        // stable, so equal ticks keep stream order and the last one survives below
        merged.sort_by_key(|event| event.tick);

        let mut unique: Vec<TempoEvent> = Vec::with_capacity(merged.len() + 1);
        for event in merged.into_iter() {
            match unique.last_mut() {
                Some(last) if last.tick == event.tick => {
                    debug!(
                        "Tempo {} us/qn at tick {} replaced by {} us/qn",
                        last.micros_per_beat, event.tick, event.micros_per_beat
                    );
                    *last = event;
                }
                _ => unique.push(event),
            }
        }

        if unique.first().is_none_or(|first| first.tick != 0) {
            unique.insert(0, TempoEvent::new(0, DEFAULT_MICROS_PER_BEAT));
        }

        Ok(Self::accumulate(ticks_per_beat, &unique))
    }

    /// Builds the map from a single in-order tempo event stream.
    pub fn new(ticks_per_beat: u32, events: &[TempoEvent]) -> Result<Self, DecodeError> {
        Self::from_tracks(ticks_per_beat, &[events])
    }

    /// A map with only the default tempo of 120 BPM.
    pub fn constant(ticks_per_beat: u32) -> Result<Self, DecodeError> {
        Self::from_tracks::<&[TempoEvent]>(ticks_per_beat, &[])
    }

    /// Takes an already merged breakpoint table as-is.
    ///
    /// Unlike [`TempoMap::from_tracks`] nothing is synthesized: the table must
    /// be non-empty, start at tick 0 and be strictly increasing in tick.
    pub fn from_breakpoints(
        ticks_per_beat: u32,
        breakpoints: &[TempoEvent],
    ) -> Result<Self, DecodeError> {
        if ticks_per_beat == 0 {
            return Err(DecodeError::InvalidTicksPerBeat);
        }

        let Some(first) = breakpoints.first() else {
            return Err(DecodeError::EmptyTempoMap);
        };
        if first.tick != 0 {
            return Err(DecodeError::MalformedEventOrder {
                stream: Stream::Tempo,
                index: 0,
                tick: first.tick,
                previous: 0,
            });
        }

        for (index, event) in breakpoints.iter().enumerate() {
            if event.micros_per_beat == 0 {
                return Err(DecodeError::InvalidTempo {
                    index,
                    tick: event.tick,
                });
            }
            if index > 0 && event.tick <= breakpoints[index - 1].tick {
                return Err(DecodeError::MalformedEventOrder {
                    stream: Stream::Tempo,
                    index,
                    tick: event.tick,
                    previous: breakpoints[index - 1].tick,
                });
            }
        }

        Ok(Self::accumulate(ticks_per_beat, breakpoints))
    }

    fn accumulate(ticks_per_beat: u32, events: &[TempoEvent]) -> Self {
        let mut breakpoints: Vec<TempoBreakpoint> = Vec::with_capacity(events.len());
        let mut seconds_accum = 0.0;
        let mut last_tick = 0u64;
        let mut last_mpqn = DEFAULT_MICROS_PER_BEAT;

        for event in events.iter() {
            if event.tick > last_tick {
                seconds_accum += span_seconds(event.tick - last_tick, last_mpqn, ticks_per_beat);
            }

            breakpoints.push(TempoBreakpoint {
                tick: event.tick,
                micros_per_beat: event.micros_per_beat,
                seconds_at_start: seconds_accum,
            });

            last_tick = event.tick;
            last_mpqn = event.micros_per_beat;
        }

        Self {
            ticks_per_beat,
            breakpoints,
        }
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    pub fn breakpoints(&self) -> &[TempoBreakpoint] {
        &self.breakpoints
    }

    fn breakpoint_at(&self, tick: u64) -> &TempoBreakpoint {
        // the first breakpoint is always at tick 0, so idx >= 1
        let idx = self.breakpoints.partition_point(|bp| bp.tick <= tick);
        &self.breakpoints[idx.saturating_sub(1)]
    }

    /// Absolute time of `tick` in seconds.
    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        let bp = self.breakpoint_at(tick);
        bp.seconds_at_start + span_seconds(tick - bp.tick, bp.micros_per_beat, self.ticks_per_beat)
    }

    /// Tempo in effect at `tick`.
    pub fn micros_per_beat_at(&self, tick: u64) -> u32 {
        self.breakpoint_at(tick).micros_per_beat
    }

    /// Tempo at tick 0 in beats per minute.
    pub fn initial_bpm(&self) -> f64 {
        TempoEvent::new(0, self.micros_per_beat_at(0)).bpm()
    }
}

fn span_seconds(ticks: u64, micros_per_beat: u32, ticks_per_beat: u32) -> f64 {
    (ticks as f64) * f64::from(micros_per_beat) / f64::from(ticks_per_beat) / MICROS_PER_SECOND
}
