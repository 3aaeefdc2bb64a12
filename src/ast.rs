//! # Score Model
//!
//! Plain data types for a tablature score after it has been read from
//! MusicXML. Every optional-child check on the source document happens once,
//! in the reader; the timeline walk only matches on these types.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   └── Vec<Part>
//!         ├── id, name, program
//!         ├── Vec<TuningEntry> (step, octave, alter), index 0 = string "1"
//!         └── Vec<Measure>
//!               ├── time_change: Option<TimeChange> (beats, beat_type)
//!               └── Vec<Note>
//!                     ├── voice
//!                     ├── kind: NoteKind (Pitched | Rest | Unfretted)
//!                     ├── duration: DurationSpec (name, dotted, tuplet)
//!                     ├── chord: bool
//!                     ├── tie: TieRole (None | Start | Continue | Stop)
//!                     ├── grace: Option<Grace>
//!                     └── dynamics: Option<String>
//! ```
//!
//! ## Related Modules
//! - `musicxml` - Builds these types from a MusicXML document
//! - `timeline` - Walks measures and notes into timed events

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    /// Length of one full measure in quarter-note units.
    pub fn quarters(&self) -> f64 {
        self.beats as f64 / self.beat_type as f64 * 4.0
    }

    /// Take over whichever values `change` declares.
    pub fn apply(&mut self, change: TimeChange) {
        if let Some(beats) = change.beats {
            self.beats = beats;
        }
        if let Some(beat_type) = change.beat_type {
            self.beat_type = beat_type;
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

/// Time signature values declared by a measure; either may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeChange {
    pub beats: Option<u32>,
    pub beat_type: Option<u32>,
}

impl From<TimeSignature> for TimeChange {
    fn from(time_signature: TimeSignature) -> Self {
        Self {
            beats: Some(time_signature.beats),
            beat_type: Some(time_signature.beat_type),
        }
    }
}

/// One open string of a tuning, as written in `<staff-tuning>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningEntry {
    pub step: String,
    pub octave: i32,
    pub alter: i32,
}

/// Tuplet scaling: `actual` notes played in the time of `normal` notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TupletRatio {
    pub actual: u32,
    pub normal: u32,
}

impl Default for TupletRatio {
    fn default() -> Self {
        Self {
            actual: 1,
            normal: 1,
        }
    }
}

/// Symbolic duration of a note, resolved later by [`crate::duration`].
#[derive(Debug, Clone, PartialEq)]
pub struct DurationSpec {
    /// MusicXML `<type>` name: "quarter", "eighth", "16th", ...
    pub name: String,
    pub dotted: bool,
    pub tuplet: TupletRatio,
}

impl DurationSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dotted: false,
            tuplet: TupletRatio::default(),
        }
    }
}

/// What a note contributes to the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteKind {
    /// Fretted note; `string` is a 0-based index into the part's tuning.
    Pitched { string: usize, fret: u32 },
    /// Silence that only advances time.
    Rest,
    /// Neither a rest nor a tablature position: consumes no time, emits nothing.
    Unfretted,
}

/// Position of a note inside a tied group
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TieRole {
    #[default]
    None,
    /// Opens a tie; nothing is emitted yet.
    Start,
    /// Stops one tie and starts the next (middle segment).
    Continue,
    /// Closes the tie and emits the accumulated note.
    Stop,
}

/// Grace note that borrows the tail of the previously emitted note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grace {
    pub steal_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub voice: u32,
    pub kind: NoteKind,
    pub duration: DurationSpec,
    /// Shares its start time with the preceding note.
    pub chord: bool,
    pub tie: TieRole,
    pub grace: Option<Grace>,
    /// Dynamics marking tag such as "mf"; `None` uses the configured default.
    pub dynamics: Option<String>,
}

impl Note {
    /// A plain voice-1 note on `string` (0-based) and `fret`.
    pub fn fretted(string: usize, fret: u32, duration: &str) -> Self {
        Self {
            voice: 1,
            kind: NoteKind::Pitched { string, fret },
            duration: DurationSpec::new(duration),
            chord: false,
            tie: TieRole::None,
            grace: None,
            dynamics: None,
        }
    }

    /// A voice-1 rest.
    pub fn rest(duration: &str) -> Self {
        Self {
            kind: NoteKind::Rest,
            ..Self::fretted(0, 0, duration)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measure {
    /// MusicXML `number` attribute, used in error messages.
    pub number: String,
    pub time_change: Option<TimeChange>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub id: String,
    pub name: String,
    /// General MIDI program number as written in `<midi-program>`.
    pub program: u8,
    pub tuning: Vec<TuningEntry>,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    pub parts: Vec<Part>,
}
