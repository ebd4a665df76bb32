//! Decode MIDI files into timed groups of simultaneous tones.
//!
//! ```no_run
//! use miditones::import_midi_file;
//!
//! let midi = import_midi_file("song.mid")?;
//! for group in midi.track_by_index(0)?.tone_groups()? {
//!     for tone in &group {
//!         println!("{} at {:.3}s", tone, tone.start_time);
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

mod error;
mod grouping;
mod midi_importer;
mod model;
pub mod pitch;
mod resolver;
mod tempo;
mod util;

pub use error::*;
pub use grouping::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::event::*;
pub use model::instruments::*;
pub use model::midi::*;
pub use model::tone::*;
pub use model::track::*;
pub use resolver::*;
pub use tempo::*;
pub use util::*;
