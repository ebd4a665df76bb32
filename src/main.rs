use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use miditones::{Args, ToneGroup, default_track, import_midi_file, select_track};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    info!("Importing MIDI file: '{}'...", args.midi.display());
    let midi = import_midi_file(&args.midi)?;

    info!(
        "Tempo: {:.2} BPM, ticks per beat: {}",
        midi.tempo_bpm(),
        midi.ticks_per_beat()
    );
    for track in midi.tracks() {
        info!(
            "Track {}: '{}' channel {} ({} events)",
            track.index(),
            track.name(),
            track.channel(),
            track.events().len()
        );
    }

    let track = match args.track.as_deref() {
        Some(selector) => select_track(&midi, selector)?,
        None => default_track(&midi)?,
    };

    let groups = track.tone_groups()?;
    for rejected in groups.rejected() {
        warn!("Skipped event: {}", rejected);
    }

    let groups: Vec<ToneGroup> = groups.take(args.max_groups).collect();
    debug!(
        "Decoded {} tone group(s) from track '{}'..!",
        groups.len(),
        track.name()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    info!("Previewing at most {} tone groups..!", args.max_groups);
    for (i, group) in groups.iter().enumerate() {
        if group.is_chord() {
            let names: Vec<&str> = group.iter().map(|tone| tone.note_full.as_str()).collect();
            info!(
                "Group {}: t={:.3}s chord [{}]",
                i,
                group.start_time,
                names.join(", ")
            );
        } else {
            info!("Group {}: t={:.3}s {}", i, group.start_time, group.tones[0]);
        }
    }

    info!(
        "Track '{}': {} tones, {:.2}s",
        track.name(),
        track.tone_count()?,
        track.duration()?
    );

    Ok(())
}
