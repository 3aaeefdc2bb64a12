//! Pitch resolution: symbolic names and tablature positions to MIDI note numbers.
//!
//! Uses the standard MIDI convention where octave -1 starts at note 0, so
//! C4 = 60 and A4 = 69.

use crate::ast::TuningEntry;
use crate::error::TabError;

/// Semitone offset of a natural note letter from C
fn letter_semitone(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Resolve a pitch name like `"E2"`, `"F#3"`, `"Bb-1"` to a MIDI note number.
///
/// The name must be a letter `C`..`B`, an optional `#` or `b`, and a single
/// signed octave digit, with nothing after it.
///
/// # Examples
/// ```
/// use tabmidi::pitch::resolve_pitch;
///
/// assert_eq!(resolve_pitch("C4").unwrap(), 60);
/// assert_eq!(resolve_pitch("F#3").unwrap(), 54);
/// assert_eq!(resolve_pitch("C-1").unwrap(), 0);
/// assert!(resolve_pitch("H2").is_err());
/// ```
pub fn resolve_pitch(name: &str) -> Result<i32, TabError> {
    let invalid = || TabError::InvalidPitch(name.to_string());
    let mut chars = name.chars().peekable();

    let base = chars.next().and_then(letter_semitone).ok_or_else(invalid)?;

    let accidental = match chars.peek() {
        Some('#') => {
            chars.next();
            1
        }
        Some('b') => {
            chars.next();
            -1
        }
        _ => 0,
    };

    let negative = chars.next_if_eq(&'-').is_some();
    let digit = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(invalid)? as i32;
    if chars.next().is_some() {
        return Err(invalid());
    }
    let octave = if negative { -digit } else { digit };

    Ok((octave + 1) * 12 + base + accidental)
}

/// Resolve one `<staff-tuning>` entry to the absolute pitch of the open string.
///
/// `alter` is added on top of the named pitch, so `("E", 2, -1)` gives Eb2.
pub fn resolve_tuning_pitch(step: &str, octave: i32, alter: i32) -> Result<i32, TabError> {
    resolve_pitch(&format!("{}{}", step, octave))?
        .checked_add(alter)
        .ok_or_else(|| TabError::InvalidPitch(format!("{}{} altered by {}", step, octave, alter)))
}

/// Resolve a part's full tuning, lowest index first.
pub fn resolve_tuning(entries: &[TuningEntry]) -> Result<Vec<i32>, TabError> {
    entries
        .iter()
        .map(|entry| resolve_tuning_pitch(&entry.step, entry.octave, entry.alter))
        .collect()
}

/// Pitch sounding on `string` (0-based index into `tuning`) at `fret`.
pub fn resolve_playing_pitch(tuning: &[i32], string: usize, fret: u32) -> Result<i32, TabError> {
    let open = tuning.get(string).ok_or(TabError::StringOutOfRange {
        string,
        strings: tuning.len(),
    })?;
    i32::try_from(fret)
        .ok()
        .and_then(|fret| open.checked_add(fret))
        .ok_or(TabError::FretOutOfRange { string, fret })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_notes() {
        // C4=60, D4=62, E4=64, F4=65, G4=67, A4=69, B4=71
        assert_eq!(resolve_pitch("C4").unwrap(), 60);
        assert_eq!(resolve_pitch("D4").unwrap(), 62);
        assert_eq!(resolve_pitch("E4").unwrap(), 64);
        assert_eq!(resolve_pitch("F4").unwrap(), 65);
        assert_eq!(resolve_pitch("G4").unwrap(), 67);
        assert_eq!(resolve_pitch("A4").unwrap(), 69);
        assert_eq!(resolve_pitch("B4").unwrap(), 71);
    }

    #[test]
    fn test_accidentals_and_negative_octave() {
        assert_eq!(resolve_pitch("C#4").unwrap(), 61);
        assert_eq!(resolve_pitch("Db4").unwrap(), 61);
        assert_eq!(resolve_pitch("Cb4").unwrap(), 59);
        assert_eq!(resolve_pitch("B-1").unwrap(), 11);
        assert_eq!(resolve_pitch("Bb-1").unwrap(), 10);
    }

    #[test]
    fn test_malformed_names() {
        for name in ["", "H4", "c4", "C", "C#", "C10", "C4x", "C##4", "-1"] {
            assert_eq!(
                resolve_pitch(name),
                Err(TabError::InvalidPitch(name.to_string())),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_standard_guitar_tuning() {
        let entries: Vec<TuningEntry> = [("E", 2), ("A", 2), ("D", 3), ("G", 3), ("B", 3), ("E", 4)]
            .iter()
            .map(|(step, octave)| TuningEntry {
                step: step.to_string(),
                octave: *octave,
                alter: 0,
            })
            .collect();
        assert_eq!(resolve_tuning(&entries).unwrap(), vec![40, 45, 50, 55, 59, 64]);
    }

    #[test]
    fn test_tuning_alter() {
        // Eb standard low string
        assert_eq!(resolve_tuning_pitch("E", 2, -1).unwrap(), 39);
        assert!(resolve_tuning_pitch("X", 2, 0).is_err());
    }

    #[test]
    fn test_playing_pitch() {
        let tuning = [40, 45, 50, 55, 59, 64];
        assert_eq!(resolve_playing_pitch(&tuning, 0, 3).unwrap(), 43);
        assert_eq!(resolve_playing_pitch(&tuning, 5, 12).unwrap(), 76);
        assert_eq!(
            resolve_playing_pitch(&tuning, 6, 0),
            Err(TabError::StringOutOfRange { string: 6, strings: 6 })
        );
    }

    #[test]
    fn test_playing_pitch_huge_fret() {
        let tuning = [40, 45, 50, 55, 59, 64];
        // Past i32::MAX, and inside i32 but overflowing once the open string is added
        for fret in [u32::MAX, i32::MAX as u32] {
            assert_eq!(
                resolve_playing_pitch(&tuning, 0, fret),
                Err(TabError::FretOutOfRange { string: 0, fret })
            );
        }
    }

    #[test]
    fn test_tuning_pitch_huge_alter() {
        assert_eq!(resolve_tuning_pitch("E", 2, -1).unwrap(), 39);
        assert!(matches!(
            resolve_tuning_pitch("E", 2, i32::MAX),
            Err(TabError::InvalidPitch(_))
        ));
    }
}
