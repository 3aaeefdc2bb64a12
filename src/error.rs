//! # Error Types
//!
//! This module defines all error types for the tablature converter.
//!
//! Every failure is fatal for the whole document: there is no per-note skip
//! policy. Two situations are deliberately *not* errors and are reported as
//! timeline diagnostics instead (see [`crate::timeline::Timeline`]):
//! - a tie-stop with no matching pending tie
//! - a tie that is never stopped before the part ends
//!
//! ## Usage
//! ```rust
//! use tabmidi::{convert, TabError};
//!
//! match convert("<score-timewise/>") {
//!     Ok(tracks) => println!("{} tracks", tracks.len()),
//!     Err(TabError::InvalidScore(message)) => eprintln!("Bad score: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TabError {
    /// Pitch name that does not match `<letter>[#|b]<octave>`.
    ///
    /// # Example
    /// ```
    /// # use tabmidi::TabError;
    /// let err = TabError::InvalidPitch("H4".to_string());
    /// assert_eq!(err.to_string(), "Invalid pitch name: H4");
    /// ```
    #[error("Invalid pitch name: {0}")]
    InvalidPitch(String),

    /// Note type that has no entry in the duration table.
    #[error("Unknown duration type: {0}")]
    UnknownDuration(String),

    /// Dynamics marking outside `ppp`..`fff`.
    #[error("Unknown dynamics marking: {0}")]
    UnknownDynamics(String),

    /// Tablature string index past the end of the part's tuning.
    ///
    /// # Example
    /// ```
    /// # use tabmidi::TabError;
    /// let err = TabError::StringOutOfRange { string: 6, strings: 6 };
    /// assert_eq!(err.to_string(), "String index 6 out of range for a 6-string tuning");
    /// ```
    #[error("String index {string} out of range for a {strings}-string tuning")]
    StringOutOfRange { string: usize, strings: usize },

    /// Fret number too large to add to the open-string pitch.
    #[error("Fret {fret} on string index {string} is out of range")]
    FretOutOfRange { string: usize, fret: u32 },

    /// Grace note with nothing emitted before it to borrow time from.
    #[error("Grace note in measure {measure} has no preceding note to steal time from")]
    GraceWithoutPrecedingNote { measure: String },

    /// Resolved pitch that does not fit a MIDI note number.
    #[error("Pitch {pitch} in measure {measure} is outside the MIDI range 0-127")]
    PitchOutOfRange { measure: String, pitch: i32 },

    /// The input is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// Well-formed XML that is not a usable partwise score.
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// Conversion options that failed to load or validate.
    #[error("Invalid options: {0}")]
    Options(String),
}
