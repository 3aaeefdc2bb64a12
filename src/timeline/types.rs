//! Timeline output type definitions
//!
//! These are the values handed to an external encoder: nothing here knows
//! about MIDI files, only about channels, pitches and quarter-note times.

use serde::Serialize;

/// One playable note
///
/// # Fields
/// - `channel`: Tablature string index (0 = string "1")
/// - `pitch`: MIDI note number
/// - `start_time`: Start in quarter notes from the beginning of the part
/// - `duration`: Length in quarter notes
/// - `velocity`: MIDI velocity from the dynamics marking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub channel: u8,
    pub pitch: u8,
    pub start_time: f64,
    pub duration: f64,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Structural identity of a tied note: same string, same fret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TieKey {
    pub string: usize,
    pub fret: u32,
}

/// A tie that has started but not yet been stopped
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTie {
    pub start_time: f64,
    /// Sum of every segment seen so far.
    pub duration: f64,
    pub pitch: u8,
    pub velocity: u8,
}

/// Result of walking one part's measures
///
/// Besides the events, the timeline records what the walk dropped so callers
/// can report it:
/// - `unmatched_tie_stops`: tie-stops that found no pending tie (no event emitted)
/// - `unresolved_ties`: ties still pending when the part ended (never emitted)
/// - `ignored_voice_notes`: notes outside voice 1
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    /// Events in emission order; not re-sorted by start time.
    pub events: Vec<NoteEvent>,
    pub unmatched_tie_stops: Vec<TieKey>,
    pub unresolved_ties: Vec<TieKey>,
    pub ignored_voice_notes: usize,
    /// Cursor position after the last measure.
    pub end_time: f64,
}

/// Tempo marking in beats per minute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tempo {
    pub bpm: u16,
    pub time: f64,
}

/// Instrument selection for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramChange {
    pub channel: u8,
    pub program: u8,
    pub time: f64,
}

/// Everything an encoder needs to write one part as an independent track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub name: String,
    pub tempo: Tempo,
    pub program_changes: Vec<ProgramChange>,
    pub events: Vec<NoteEvent>,
}
