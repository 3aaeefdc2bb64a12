//! Track assembly: one independent, encoder-ready unit per part.

use log::{debug, warn};

use super::engine::build_timeline;
use super::types::{ProgramChange, Tempo, Track};
use crate::ast::{Part, Score};
use crate::config::ConvertOptions;
use crate::error::TabError;
use crate::pitch::resolve_tuning;

/// Channels available to a track; each string gets its own.
pub const MIDI_CHANNELS: usize = 16;

/// Combine a part's name, per-string program changes, the tempo marking and
/// its timeline into a [`Track`].
pub fn assemble_track(part: &Part, options: &ConvertOptions) -> Result<Track, TabError> {
    let tuning = resolve_tuning(&part.tuning)?;
    if tuning.len() > MIDI_CHANNELS {
        return Err(TabError::InvalidScore(format!(
            "part {} has {} strings but only {} channels are available",
            part.id,
            tuning.len(),
            MIDI_CHANNELS
        )));
    }
    debug!(
        "part {} ({:?}): {} strings, {} measures",
        part.id,
        part.name,
        tuning.len(),
        part.measures.len()
    );

    let timeline = build_timeline(&part.measures, &tuning, options.default_dynamics)?;
    if timeline.ignored_voice_notes > 0 {
        debug!(
            "part {}: {} notes outside voice 1 ignored",
            part.id, timeline.ignored_voice_notes
        );
    }
    let dropped = timeline.unmatched_tie_stops.len() + timeline.unresolved_ties.len();
    if dropped > 0 {
        warn!("part {}: {} tied notes dropped", part.id, dropped);
    }

    let program_changes = (0..tuning.len())
        .map(|channel| ProgramChange {
            channel: channel as u8,
            program: part.program,
            time: 0.0,
        })
        .collect();

    Ok(Track {
        name: part.name.clone(),
        tempo: Tempo {
            bpm: options.tempo,
            time: 0.0,
        },
        program_changes,
        events: timeline.events,
    })
}

/// Assemble every part of a score, in part-list order.
pub fn assemble_tracks(score: &Score, options: &ConvertOptions) -> Result<Vec<Track>, TabError> {
    score
        .parts
        .iter()
        .map(|part| assemble_track(part, options))
        .collect()
}
