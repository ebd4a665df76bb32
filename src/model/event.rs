use serde::{Deserialize, Serialize};

/// 120 BPM, used until a tempo event says otherwise.
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;
pub const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceMessage {
    /// A velocity of 0 is treated as a note-off.
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8, velocity: u8 },
    ProgramChange { program: u8 },
}

/// A channel-voice message at an absolute tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent {
    pub tick: u64,
    pub channel: u8,
    pub message: VoiceMessage,
}

impl ChannelEvent {
    pub const fn note_on(tick: u64, channel: u8, key: u8, velocity: u8) -> Self {
        Self {
            tick,
            channel,
            message: VoiceMessage::NoteOn { key, velocity },
        }
    }

    pub const fn note_off(tick: u64, channel: u8, key: u8) -> Self {
        Self {
            tick,
            channel,
            message: VoiceMessage::NoteOff { key, velocity: 0 },
        }
    }

    pub const fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self {
            tick,
            channel,
            message: VoiceMessage::ProgramChange { program },
        }
    }
}

/// A set-tempo meta event at an absolute tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoEvent {
    pub tick: u64,
    pub micros_per_beat: u32,
}

impl TempoEvent {
    pub const fn new(tick: u64, micros_per_beat: u32) -> Self {
        Self {
            tick,
            micros_per_beat,
        }
    }

    pub fn bpm(&self) -> f64 {
        MICROSECONDS_PER_MINUTE / f64::from(self.micros_per_beat)
    }
}
