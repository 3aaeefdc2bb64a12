//! Timeline construction engine
//!
//! Walks one part's measures left to right, keeping a time cursor in
//! quarter-note units, and turns every voice-1 note into zero or one
//! [`NoteEvent`]. The walk is a fold: each note can change the cursor, the
//! pending-tie table, or the last emitted event, so notes of a part are never
//! processed out of order.

use std::collections::HashMap;

use log::{debug, warn};

use super::types::{NoteEvent, PendingTie, TieKey, Timeline};
use crate::ast::{Grace, Measure, Note, NoteKind, TieRole, TimeSignature};
use crate::config::TRACKED_VOICE;
use crate::duration::resolve_duration;
use crate::dynamics::{resolve_velocity, Dynamics};
use crate::error::TabError;
use crate::pitch::resolve_playing_pitch;

/// Stateful builder for a single part's timeline
///
/// # State
/// - `time`: cursor in quarter notes, starts at 0
/// - `time_signature`: starts at 4/4; beats and beat type update independently
/// - `ties`: pending ties keyed by (string, fret); lives for the whole part
/// - `last_emitted`: index into `events` of the most recent emission, which a
///   grace note shortens in place
/// - `last_advance`: how far the previous note moved the cursor, undone by a
///   chord note so both start together
///
/// # Example
/// ```rust
/// use tabmidi::ast::{Measure, Note};
/// use tabmidi::dynamics::Dynamics;
/// use tabmidi::timeline::TimelineBuilder;
///
/// let tuning = [40, 45, 50, 55, 59, 64];
/// let mut builder = TimelineBuilder::new(&tuning, Dynamics::F);
/// builder
///     .push_measure(&Measure {
///         notes: vec![Note::fretted(0, 3, "quarter"), Note::rest("half")],
///         ..Measure::default()
///     })
///     .unwrap();
///
/// assert_eq!(builder.time(), 3.0);
/// let timeline = builder.finish();
/// assert_eq!(timeline.events[0].pitch, 43);
/// ```
#[derive(Debug)]
pub struct TimelineBuilder<'a> {
    tuning: &'a [i32],
    default_dynamics: Dynamics,
    time: f64,
    time_signature: TimeSignature,
    ties: HashMap<TieKey, PendingTie>,
    events: Vec<NoteEvent>,
    last_emitted: Option<usize>,
    last_advance: f64,
    unmatched_tie_stops: Vec<TieKey>,
    abandoned_ties: Vec<TieKey>,
    ignored_voice_notes: usize,
}

impl<'a> TimelineBuilder<'a> {
    /// `tuning` holds the absolute open-string pitch per string index.
    pub fn new(tuning: &'a [i32], default_dynamics: Dynamics) -> Self {
        Self {
            tuning,
            default_dynamics,
            time: 0.0,
            time_signature: TimeSignature::default(),
            ties: HashMap::new(),
            events: Vec::new(),
            last_emitted: None,
            last_advance: 0.0,
            unmatched_tie_stops: Vec::new(),
            abandoned_ties: Vec::new(),
            ignored_voice_notes: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    /// Walk one measure.
    ///
    /// A measure without any `<note>` (in any voice) advances the cursor by
    /// one full bar of the current time signature.
    pub fn push_measure(&mut self, measure: &Measure) -> Result<(), TabError> {
        if let Some(change) = measure.time_change {
            self.time_signature.apply(change);
        }

        if measure.notes.is_empty() {
            self.time += self.time_signature.quarters();
            return Ok(());
        }

        for note in &measure.notes {
            // Only one melodic line per tablature part is tracked
            if note.voice != TRACKED_VOICE {
                self.ignored_voice_notes += 1;
                debug!(
                    "measure {}: dropping note in voice {}",
                    measure.number, note.voice
                );
                continue;
            }
            self.push_note(note, &measure.number)?;
        }
        Ok(())
    }

    fn push_note(&mut self, note: &Note, measure: &str) -> Result<(), TabError> {
        let (string, fret) = match note.kind {
            NoteKind::Pitched { string, fret } => (string, fret),
            NoteKind::Rest => {
                let duration = self.note_duration(note)?;
                self.rewind_for_chord(note);
                self.advance(duration);
                return Ok(());
            }
            NoteKind::Unfretted => {
                self.note_duration(note)?;
                debug!("measure {}: skipping note without tablature position", measure);
                return Ok(());
            }
        };

        let duration = self.note_duration(note)?;
        self.rewind_for_chord(note);

        let channel = u8::try_from(string).map_err(|_| TabError::StringOutOfRange {
            string,
            strings: self.tuning.len(),
        })?;
        let (pitch, velocity) = self.resolve_sound(note, string, fret, measure)?;
        let key = TieKey { string, fret };

        match note.tie {
            TieRole::Start => {
                self.open_tie(key, duration, pitch, velocity, measure);
                self.advance(duration);
            }
            TieRole::Continue => {
                match self.ties.get_mut(&key) {
                    Some(pending) => pending.duration += duration,
                    None => self.open_tie(key, duration, pitch, velocity, measure),
                }
                self.advance(duration);
            }
            TieRole::Stop => {
                match self.ties.remove(&key) {
                    Some(pending) => self.emit(NoteEvent {
                        channel,
                        pitch: pending.pitch,
                        start_time: pending.start_time,
                        duration: pending.duration + duration,
                        velocity: pending.velocity,
                    }),
                    None => {
                        warn!(
                            "measure {}: tie stop on string {} fret {} has no matching start; note dropped",
                            measure,
                            string + 1,
                            fret
                        );
                        self.unmatched_tie_stops.push(key);
                    }
                }
                self.advance(duration);
            }
            TieRole::None => match note.grace {
                Some(grace) => self.push_grace(grace, channel, pitch, velocity, measure)?,
                None => {
                    self.emit(NoteEvent {
                        channel,
                        pitch,
                        start_time: self.time,
                        duration,
                        velocity,
                    });
                    self.advance(duration);
                }
            },
        }
        Ok(())
    }

    /// Shorten the last emitted event by the stolen share and place the grace
    /// note right after it.
    fn push_grace(
        &mut self,
        grace: Grace,
        channel: u8,
        pitch: u8,
        velocity: u8,
        measure: &str,
    ) -> Result<(), TabError> {
        let index = self
            .last_emitted
            .ok_or_else(|| TabError::GraceWithoutPrecedingNote {
                measure: measure.to_string(),
            })?;

        let previous = &mut self.events[index];
        let stolen = previous.duration * grace.steal_percent / 100.0;
        previous.duration -= stolen;
        let start_time = previous.end_time();

        self.emit(NoteEvent {
            channel,
            pitch,
            start_time,
            duration: stolen,
            velocity,
        });
        self.time = start_time + stolen;
        self.last_advance = stolen;
        Ok(())
    }

    fn open_tie(&mut self, key: TieKey, duration: f64, pitch: u8, velocity: u8, measure: &str) {
        let pending = PendingTie {
            start_time: self.time,
            duration,
            pitch,
            velocity,
        };
        if let Some(replaced) = self.ties.insert(key, pending) {
            warn!(
                "measure {}: tie on string {} fret {} restarted before being stopped; {} quarters dropped",
                measure,
                key.string + 1,
                key.fret,
                replaced.duration
            );
            self.abandoned_ties.push(key);
        }
    }

    fn note_duration(&self, note: &Note) -> Result<f64, TabError> {
        let spec = &note.duration;
        resolve_duration(
            &spec.name,
            spec.tuplet.normal,
            spec.tuplet.actual,
            spec.dotted,
        )
    }

    fn resolve_sound(
        &self,
        note: &Note,
        string: usize,
        fret: u32,
        measure: &str,
    ) -> Result<(u8, u8), TabError> {
        let pitch = resolve_playing_pitch(self.tuning, string, fret)?;
        let midi_pitch = u8::try_from(pitch)
            .ok()
            .filter(|p| *p <= 127)
            .ok_or_else(|| TabError::PitchOutOfRange {
                measure: measure.to_string(),
                pitch,
            })?;
        let velocity = resolve_velocity(note.dynamics.as_deref(), self.default_dynamics)?;
        Ok((midi_pitch, velocity))
    }

    fn rewind_for_chord(&mut self, note: &Note) {
        if note.chord {
            self.time -= self.last_advance;
        }
    }

    fn advance(&mut self, duration: f64) {
        self.time += duration;
        self.last_advance = duration;
    }

    fn emit(&mut self, event: NoteEvent) {
        self.events.push(event);
        self.last_emitted = Some(self.events.len() - 1);
    }

    /// Close the walk. Ties still pending are reported, never emitted.
    pub fn finish(self) -> Timeline {
        let mut unresolved_ties = self.abandoned_ties;
        let mut remaining: Vec<TieKey> = self.ties.into_keys().collect();
        remaining.sort();
        for key in &remaining {
            warn!(
                "tie on string {} fret {} never stopped; note dropped",
                key.string + 1,
                key.fret
            );
        }
        unresolved_ties.extend(remaining);

        Timeline {
            events: self.events,
            unmatched_tie_stops: self.unmatched_tie_stops,
            unresolved_ties,
            ignored_voice_notes: self.ignored_voice_notes,
            end_time: self.time,
        }
    }
}

/// Build the timeline for a whole part in one call.
pub fn build_timeline(
    measures: &[Measure],
    tuning: &[i32],
    default_dynamics: Dynamics,
) -> Result<Timeline, TabError> {
    let mut builder = TimelineBuilder::new(tuning, default_dynamics);
    for measure in measures {
        builder.push_measure(measure)?;
    }
    Ok(builder.finish())
}
