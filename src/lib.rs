pub mod ast;
pub mod config;
pub mod duration;
pub mod dynamics;
pub mod error;
pub mod musicxml;
pub mod pitch;
pub mod timeline;

pub use config::ConvertOptions;
pub use error::*;
pub use musicxml::read_score;
pub use timeline::{assemble_tracks, NoteEvent, Track};

/// Convert a MusicXML tablature document into one track per part.
/// This is the main entry point for the library.
pub fn convert(xml: &str) -> Result<Vec<Track>, TabError> {
    convert_with_options(xml, &ConvertOptions::default())
}

/// Convert with a non-default tempo or default dynamics
pub fn convert_with_options(xml: &str, options: &ConvertOptions) -> Result<Vec<Track>, TabError> {
    let score = read_score(xml)?;
    assemble_tracks(&score, options)
}
