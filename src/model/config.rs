use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "miditones",
    about = "List the tracks of a MIDI file and the tones they play."
)]
pub struct Args {
    /// Path to the target MIDI file.
    pub midi: PathBuf,

    /// Track to decode, by name or zero-based index. Defaults to the first track with notes.
    #[arg(short, long)]
    pub track: Option<String>,

    /// Maximum tone groups to print.
    #[arg(short, long, default_value_t = 80)]
    pub max_groups: usize,

    /// Print the decoded tone groups as JSON instead of log lines.
    #[arg(short, long, default_value_t = false)]
    pub json: bool,

    /// Prints extra information to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
