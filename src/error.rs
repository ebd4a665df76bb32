//! Errors raised while building a tempo map or decoding a track.
//!
//! Event-level variants carry the event's index in its stream and its tick so
//! the caller can find the offending message.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Channel,
    Tempo,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Channel => f.write_str("channel event"),
            Stream::Tempo => f.write_str("tempo event"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Pitch,
    Velocity,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Pitch => f.write_str("pitch"),
            Field::Velocity => f.write_str("velocity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// An event is earlier than the one before it in the same stream.
    #[error("{stream} {index} at tick {tick} is earlier than the previous tick {previous}")]
    MalformedEventOrder {
        stream: Stream,
        index: usize,
        tick: u64,
        previous: u64,
    },

    /// The event was skipped, decoding carried on without it.
    #[error("{stream} {index} at tick {tick} has {field} {value} outside 0..=127")]
    InvalidPitchOrVelocity {
        stream: Stream,
        index: usize,
        tick: u64,
        field: Field,
        value: u8,
    },

    /// The event was skipped, decoding carried on without it.
    #[error("channel event {index} at tick {tick} has channel {channel} outside 0..=15")]
    InvalidChannel { index: usize, tick: u64, channel: u8 },

    /// The event was skipped, decoding carried on without it.
    #[error("channel event {index} at tick {tick} has program {program} outside 0..=127")]
    InvalidProgram { index: usize, tick: u64, program: u8 },

    #[error("tempo map has no breakpoints")]
    EmptyTempoMap,

    #[error("ticks per beat must be positive")]
    InvalidTicksPerBeat,

    #[error("tempo event {index} at tick {tick} has a tempo of 0 microseconds per beat")]
    InvalidTempo { index: usize, tick: u64 },
}

impl DecodeError {
    /// Whether decoding continues past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidPitchOrVelocity { .. }
                | DecodeError::InvalidChannel { .. }
                | DecodeError::InvalidProgram { .. }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_identify_the_event() {
        let err = DecodeError::MalformedEventOrder {
            stream: Stream::Channel,
            index: 3,
            tick: 10,
            previous: 20,
        };
        assert_eq!(
            err.to_string(),
            "channel event 3 at tick 10 is earlier than the previous tick 20"
        );

        let err = DecodeError::InvalidPitchOrVelocity {
            stream: Stream::Channel,
            index: 0,
            tick: 5,
            field: Field::Velocity,
            value: 200,
        };
        assert_eq!(
            err.to_string(),
            "channel event 0 at tick 5 has velocity 200 outside 0..=127"
        );
    }

    #[test]
    fn only_value_errors_are_recoverable() {
        assert!(DecodeError::InvalidChannel { index: 0, tick: 0, channel: 16 }.is_recoverable());
        assert!(!DecodeError::EmptyTempoMap.is_recoverable());
        assert!(!DecodeError::InvalidTicksPerBeat.is_recoverable());
    }
}
