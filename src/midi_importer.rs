use crate::model::event::{ChannelEvent, TempoEvent};
use crate::model::instruments::program_name;
use crate::model::midi::Midi;
use crate::model::track::Track;
use crate::resolver::first_program;
use crate::tempo::TempoMap;
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a track offers for naming itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackLabel {
    /// First non-blank track name meta event, trimmed.
    pub name: Option<String>,
    /// First program change.
    pub program: Option<u8>,
}

struct RawTrack {
    label: TrackLabel,
    events: Vec<ChannelEvent>,
    tempo_changes: Vec<TempoEvent>,
    end_tick: u64,
}

pub fn import_midi_file<P: AsRef<Path>>(path: P) -> Result<Midi> {
    let bytes = fs::read(path.as_ref()).map_err(|e| {
        anyhow!(
            "Failed to read MIDI file {}: {}",
            path.as_ref().display(),
            e
        )
    })?;

    midi_bytes_to_midi(&bytes, Some(path.as_ref().to_path_buf()))
}

/// Parses an in-memory Standard MIDI File.
pub fn parse_midi_bytes(bytes: &[u8]) -> Result<Midi> {
    midi_bytes_to_midi(bytes, None)
}

fn midi_bytes_to_midi(bytes: &[u8], source: Option<PathBuf>) -> Result<Midi> {
    let smf = Smf::parse(bytes).map_err(|e| anyhow!("Failed to parse MIDI: {:?}", e))?;

    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(t) => u32::from(t.as_int()),
        Timing::Timecode(_fps, _subframe) => {
            bail!("SMPTE timecode midi timing is not currently supported..!");
        }
    };

    debug!("Ticks per quarter note: {}", ticks_per_beat);
    debug!(
        "MIDI format: {:?}, tracks: {}",
        smf.header.format,
        smf.tracks.len()
    );

    let raw_tracks: Vec<RawTrack> = smf
        .tracks
        .iter()
        .enumerate()
        .map(|(track_idx, track)| read_track(track_idx, track))
        .collect();

    let tempo_streams: Vec<&[TempoEvent]> = raw_tracks
        .iter()
        .map(|raw| raw.tempo_changes.as_slice())
        .collect();
    let tempo = Arc::new(
        TempoMap::from_tracks(ticks_per_beat, tempo_streams.as_slice())
            .context("Failed to build the tempo map")?,
    );

    let labels: Vec<TrackLabel> = raw_tracks.iter().map(|raw| raw.label.clone()).collect();
    let names = resolve_track_names(&labels);

    let tracks = raw_tracks
        .into_iter()
        .zip(names)
        .enumerate()
        .map(|(idx, (raw, name))| {
            debug!(
                "Track {} '{}': {} channel events, ends at tick {}",
                idx,
                name,
                raw.events.len(),
                raw.end_tick
            );
            Track::new(name, idx, raw.events, raw.end_tick, Arc::clone(&tempo))
        })
        .collect();

    Ok(Midi::new(source, tempo, tracks))
}

fn read_track(track_idx: usize, track: &[TrackEvent<'_>]) -> RawTrack {
    let mut abs_tick: u64 = 0;
    let mut name: Option<String> = None;
    let mut events: Vec<ChannelEvent> = Vec::new();
    let mut tempo_changes: Vec<TempoEvent> = Vec::new();

    for event in track.iter() {
        abs_tick = abs_tick.saturating_add(u64::from(event.delta.as_int()));

        match &event.kind {
            TrackEventKind::Meta(meta) => match meta {
                MetaMessage::Tempo(micro) => {
                    let mpqn: u32 = micro.as_int();
                    tempo_changes.push(TempoEvent::new(abs_tick, mpqn));
                    debug!(
                        "Tempo change at tick {} -> {} us/qn (track {})",
                        abs_tick, mpqn, track_idx
                    );
                }
                MetaMessage::TrackName(bytes) => {
                    let candidate = String::from_utf8_lossy(bytes).trim().to_string();
                    if name.is_none() && !candidate.is_empty() {
                        debug!("Track name: {}", candidate);
                        name = Some(candidate);
                    }
                }
                _ => {}
            },
            TrackEventKind::Midi { channel, message } => {
                let ch: u8 = channel.as_int();

                match message {
                    MidiMessage::NoteOn { key, vel } => {
                        events.push(ChannelEvent::note_on(abs_tick, ch, key.as_int(), vel.as_int()));
                    }
                    MidiMessage::NoteOff { key, vel: _ } => {
                        events.push(ChannelEvent::note_off(abs_tick, ch, key.as_int()));
                    }
                    MidiMessage::ProgramChange { program } => {
                        events.push(ChannelEvent::program_change(abs_tick, ch, program.as_int()));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    RawTrack {
        label: TrackLabel {
            name,
            program: first_program(&events),
        },
        events,
        tempo_changes,
        end_tick: abs_tick,
    }
}

/// Picks a unique display name for every track.
///
/// A track uses its own name if it has one, otherwise the General MIDI name of
/// its first program, otherwise `"Track {index}"`. Repeated names get
/// `" (2)"`, `" (3)"`, ... in track order.
pub fn resolve_track_names(labels: &[TrackLabel]) -> Vec<String> {
    let mut name_counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(labels.len());

    for (idx, label) in labels.iter().enumerate() {
        let base = label
            .name
            .clone()
            .or_else(|| label.program.and_then(program_name).map(str::to_string))
            .unwrap_or_else(|| format!("Track {}", idx));

        let count = name_counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let mut name = if *count == 1 {
            base.clone()
        } else {
            format!("{} ({})", base, count)
        };
        while taken.contains(&name) {
            *count += 1;
            name = format!("{} ({})", base, count);
        }

        taken.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::tone::ToneGroup;

    fn vlq(mut value: u32) -> Vec<u8> {
        let mut out = vec![(value & 0x7f) as u8];
        value >>= 7;
        while value > 0 {
            out.insert(0, ((value & 0x7f) as u8) | 0x80);
            value >>= 7;
        }
        out
    }

    fn chunk(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = kind.to_vec();
        out.extend((body.len() as u32).to_be_bytes());
        out.extend(body);
        out
    }

    fn track_chunk(events: &[(u32, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (delta, bytes) in events {
            body.extend(vlq(*delta));
            body.extend(*bytes);
        }
        chunk(b"MTrk", &body)
    }

    fn smf(division: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
        let mut header = Vec::new();
        header.extend(1u16.to_be_bytes());
        header.extend((tracks.len() as u16).to_be_bytes());
        header.extend(division.to_be_bytes());

        let mut out = chunk(b"MThd", &header);
        for track in tracks {
            out.extend(track);
        }
        out
    }

    fn song_bytes() -> Vec<u8> {
        let conductor = track_chunk(&[
            (0, b"\xFF\x03\x09Conductor"),
            (0, b"\xFF\x51\x03\x07\xA1\x20"),
            (480, b"\xFF\x51\x03\x0F\x42\x40"),
            (0, b"\xFF\x2F\x00"),
        ]);
        let flute = track_chunk(&[
            (0, b"\xC0\x49"),
            (0, b"\x90\x3C\x64"),
            (0, b"\x90\x40\x50"),
            (480, b"\x80\x3C\x40"),
            (0, b"\x90\x40\x00"),
            (480, b"\x90\x43\x64"),
            (480, b"\xFF\x2F\x00"),
        ]);
        let named = track_chunk(&[
            (0, b"\xFF\x03\x07 Flute "),
            (0, b"\x91\x48\x50"),
            (96, b"\x81\x48\x00"),
            (0, b"\xFF\x2F\x00"),
        ]);
        let silent = track_chunk(&[(0, b"\xFF\x2F\x00")]);

        smf(480, &[conductor, flute, named, silent])
    }

    #[test]
    fn decodes_hand_built_file() {
        env_logger::try_init().unwrap_or(());

        let midi = parse_midi_bytes(&song_bytes()).unwrap();

        assert_eq!(midi.ticks_per_beat(), 480);
        assert_eq!(midi.tempo_bpm(), 120.0);
        assert_eq!(
            midi.list_tracks(),
            vec!["Conductor", "Flute", "Flute (2)", "Track 3"]
        );

        let flute = midi.track("Flute").unwrap();
        assert_eq!(flute.channel(), 0);
        assert_eq!(flute.program(), Some(73));
        assert_eq!(flute.end_tick(), 1440);

        let groups: Vec<ToneGroup> = flute.tone_groups().unwrap().collect();
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].midi_notes(), vec![60, 64]);
        assert_eq!(groups[0].start_time, 0.0);
        assert_eq!(groups[0].tones[0].duration, 0.5);
        assert_eq!(groups[0].tones[1].velocity, 80);

        // 480 ticks at 120 BPM, then 480 ticks at 60 BPM
        assert_eq!(groups[1].midi_notes(), vec![67]);
        assert_eq!(groups[1].start_time, 1.5);
        assert_eq!(groups[1].tones[0].duration, 1.0);
        assert_eq!(flute.duration().unwrap(), 2.5);

        let named = midi.track_by_index(2).unwrap();
        assert_eq!(named.channel(), 1);
        assert_eq!(named.tone_count().unwrap(), 1);

        assert_eq!(midi.track("Track 3").unwrap().tone_count().unwrap(), 0);
    }

    #[test]
    fn rejects_timecode_timing() {
        env_logger::try_init().unwrap_or(());

        // -25 fps, 40 subframes
        let bytes = smf(0xE728, &[track_chunk(&[(0, b"\xFF\x2F\x00")])]);
        let err = parse_midi_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("SMPTE"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_midi_bytes(b"not a midi file").is_err());
        assert!(import_midi_file("./does/not/exist.mid").is_err());
    }

    #[test]
    fn naming_falls_back_and_deduplicates() {
        let label = |name: Option<&str>, program: Option<u8>| TrackLabel {
            name: name.map(str::to_string),
            program,
        };

        let names = resolve_track_names(&[
            label(Some("Lead"), Some(0)),
            label(None, Some(0)),
            label(None, None),
            label(Some("Lead"), None),
            label(None, Some(0)),
            label(Some("Lead (2)"), None),
        ]);

        assert_eq!(
            names,
            vec![
                "Lead",
                "Acoustic Grand Piano",
                "Track 2",
                "Lead (2)",
                "Acoustic Grand Piano (2)",
                "Lead (2) (2)",
            ]
        );
    }
}
