use crate::error::{DecodeError, Field, Stream};
use crate::model::event::{ChannelEvent, VoiceMessage};
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};

const MAX_DATA_BYTE: u8 = 127;
const MAX_CHANNEL: u8 = 15;

/// A paired note in ticks, before any tempo is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNote {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    pub start_tick: u64,
    pub end_tick: u64,
}

#[derive(Debug, Clone, Copy)]
struct OpenNote {
    start_tick: u64,
    velocity: u8,
}

type OpenNotes = HashMap<(u8, u8), VecDeque<OpenNote>>;

/// Everything one pass over a track's channel events produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// In the order they were closed.
    pub notes: Vec<RawNote>,
    /// Events that were skipped because of out-of-range values.
    pub rejected: Vec<DecodeError>,
    /// Tick at which still-sounding notes were closed.
    pub end_tick: u64,
}

/// Pairs note-ons with note-offs for one track.
///
/// Overlapping notes of the same pitch on the same channel are tracked
/// independently and each note-off closes the oldest one. Notes left open are
/// closed at `end_tick`, or at the last event's tick if that is later.
/// Note-offs with nothing to close are ignored.
///
/// Fails only if the events are not in tick order. Events with out-of-range
/// values are skipped and reported in [`Resolution::rejected`].
pub fn resolve_notes(events: &[ChannelEvent], end_tick: u64) -> Result<Resolution, DecodeError> {
    let mut resolution = Resolution::default();
    let mut open_notes: OpenNotes = HashMap::new();
    let mut previous = 0u64;

    for (index, event) in events.iter().enumerate() {
        if event.tick < previous {
            return Err(DecodeError::MalformedEventOrder {
                stream: Stream::Channel,
                index,
                tick: event.tick,
                previous,
            });
        }
        previous = event.tick;

        if let Err(err) = validate(index, event) {
            warn!("Skipping {}", err);
            resolution.rejected.push(err);
            continue;
        }

        match event.message {
            VoiceMessage::NoteOn { key, velocity } if velocity > 0 => {
                open_notes
                    .entry((event.channel, key))
                    .or_default()
                    .push_back(OpenNote {
                        start_tick: event.tick,
                        velocity,
                    });
            }
            VoiceMessage::NoteOn { key, .. } | VoiceMessage::NoteOff { key, .. } => {
                close_note(
                    &mut open_notes,
                    &mut resolution.notes,
                    event.channel,
                    key,
                    event.tick,
                );
            }
            VoiceMessage::ProgramChange { .. } => {}
        }
    }

    let end_tick = end_tick.max(previous);
    resolution.end_tick = end_tick;

    let mut unclosed: Vec<RawNote> = open_notes
        .into_iter()
        .flat_map(|((channel, pitch), queue)| {
            queue.into_iter().map(move |open| RawNote {
                channel,
                pitch,
                velocity: open.velocity,
                start_tick: open.start_tick,
                end_tick,
            })
        })
        .collect();
    // stable: notes sharing a key come from one queue and keep its FIFO order
    unclosed.sort_by_key(|note| (note.start_tick, note.channel, note.pitch));

    for note in unclosed.iter() {
        warn!(
            "Unclosed NoteOn for {}, channel: {} at tick: {} auto-closing at: {}..!",
            note.pitch, note.channel, note.start_tick, note.end_tick
        );
    }
    resolution.notes.extend(unclosed);

    Ok(resolution)
}

fn valid_events(events: &[ChannelEvent]) -> impl Iterator<Item = &ChannelEvent> {
    events
        .iter()
        .enumerate()
        .filter(|(index, event)| validate(*index, event).is_ok())
        .map(|(_, event)| event)
}

/// Channel of the first valid voice event, if any.
pub fn primary_channel(events: &[ChannelEvent]) -> Option<u8> {
    valid_events(events).next().map(|event| event.channel)
}

/// Program of the first valid program change, if any.
pub fn first_program(events: &[ChannelEvent]) -> Option<u8> {
    valid_events(events).find_map(|event| match event.message {
        VoiceMessage::ProgramChange { program } => Some(program),
        _ => None,
    })
}

fn validate(index: usize, event: &ChannelEvent) -> Result<(), DecodeError> {
    if event.channel > MAX_CHANNEL {
        return Err(DecodeError::InvalidChannel {
            index,
            tick: event.tick,
            channel: event.channel,
        });
    }

    let out_of_range = |field: Field, value: u8| {
        (value > MAX_DATA_BYTE).then_some(DecodeError::InvalidPitchOrVelocity {
            stream: Stream::Channel,
            index,
            tick: event.tick,
            field,
            value,
        })
    };

    let err = match event.message {
        VoiceMessage::NoteOn { key, velocity } | VoiceMessage::NoteOff { key, velocity } => {
            out_of_range(Field::Pitch, key).or_else(|| out_of_range(Field::Velocity, velocity))
        }
        VoiceMessage::ProgramChange { program } => {
            (program > MAX_DATA_BYTE).then_some(DecodeError::InvalidProgram {
                index,
                tick: event.tick,
                program,
            })
        }
    };

    match err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn close_note(
    open_notes: &mut OpenNotes,
    notes: &mut Vec<RawNote>,
    channel: u8,
    pitch: u8,
    tick: u64,
) {
    let Some(open) = open_notes
        .get_mut(&(channel, pitch))
        .and_then(|queue| queue.pop_front())
    else {
        debug!(
            "Orphaned NoteOff for {} ch{} at tick {}..!",
            pitch, channel, tick
        );
        return;
    };

    notes.push(RawNote {
        channel,
        pitch,
        velocity: open.velocity,
        start_tick: open.start_tick,
        end_tick: tick,
    });
}
