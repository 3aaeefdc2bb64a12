//! # Timeline Module
//!
//! Turn the measures of a tablature part into a flat, time-ordered list of
//! playable note events, then package each part as a track.
//!
//! ## Sub-modules
//! - `types` - NoteEvent, Timeline, Track and the tie bookkeeping types
//! - `engine` - The stateful measure/note walk ([`TimelineBuilder`])
//! - `track` - Per-part assembly with program changes and tempo
//!
//! ## Timing
//! All times are in quarter notes from the start of the part. A note's
//! length is its type's table value, scaled by the tuplet ratio and by 1.5
//! when dotted:
//! - Dotted eighth = `0.5 * 1.5 = 0.75`
//! - Eighth-note triplet = `0.5 * 2 / 3 = 0.333`
//!
//! ## Note Handling
//! - **Rest**: advances the cursor, emits nothing
//! - **Chord**: the cursor first steps back by what the previous note
//!   advanced, so both notes start together
//! - **Tie start / continue**: accumulates into a pending entry keyed by
//!   (string, fret); nothing is emitted yet
//! - **Tie stop**: emits one event spanning every segment; a stop with no
//!   pending entry emits nothing and is recorded in
//!   [`Timeline::unmatched_tie_stops`]
//! - **Grace**: steals a percentage of the previously emitted event, which is
//!   shortened in place, and plays right after it
//! - **Empty measure**: advances by one bar of the current time signature
//!
//! ## Voices
//! Only voice 1 is walked. Other voices are counted in
//! [`Timeline::ignored_voice_notes`] and otherwise dropped; tablature parts
//! are treated as a single melodic line.
//!
//! ## Example
//! ```rust
//! use tabmidi::ast::{Measure, Note, TieRole};
//! use tabmidi::dynamics::Dynamics;
//! use tabmidi::timeline::build_timeline;
//!
//! let mut start = Note::fretted(1, 0, "quarter");
//! start.tie = TieRole::Start;
//! let mut stop = Note::fretted(1, 0, "quarter");
//! stop.tie = TieRole::Stop;
//!
//! let measures = vec![Measure { notes: vec![start, stop], ..Measure::default() }];
//! let timeline = build_timeline(&measures, &[40, 45, 50, 55, 59, 64], Dynamics::F).unwrap();
//!
//! assert_eq!(timeline.events.len(), 1);
//! assert_eq!(timeline.events[0].start_time, 0.0);
//! assert_eq!(timeline.events[0].duration, 2.0);
//! ```

mod engine;
mod track;
mod types;


pub use engine::{build_timeline, TimelineBuilder};
pub use track::{assemble_track, assemble_tracks, MIDI_CHANNELS};
pub use types::{NoteEvent, PendingTie, ProgramChange, Tempo, TieKey, Timeline, Track};
