//! Duration resolution: note type names to quarter-note units.

use crate::error::TabError;

/// Note value, from whole note down to 256th
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneTwentyEighth,
    TwoFiftySixth,
}

impl NoteType {
    /// Parse a MusicXML `<type>` name.
    ///
    /// `"32th"` is accepted alongside `"32nd"` since some exporters write it.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "whole" => Some(NoteType::Whole),
            "half" => Some(NoteType::Half),
            "quarter" => Some(NoteType::Quarter),
            "eighth" => Some(NoteType::Eighth),
            "16th" => Some(NoteType::Sixteenth),
            "32nd" | "32th" => Some(NoteType::ThirtySecond),
            "64th" => Some(NoteType::SixtyFourth),
            "128th" => Some(NoteType::OneTwentyEighth),
            "256th" => Some(NoteType::TwoFiftySixth),
            _ => None,
        }
    }

    /// Nominal length in quarter notes (whole = 4, halving per step).
    pub fn quarters(self) -> f64 {
        match self {
            NoteType::Whole => 4.0,
            NoteType::Half => 2.0,
            NoteType::Quarter => 1.0,
            NoteType::Eighth => 0.5,
            NoteType::Sixteenth => 0.25,
            NoteType::ThirtySecond => 0.125,
            NoteType::SixtyFourth => 0.0625,
            NoteType::OneTwentyEighth => 0.03125,
            NoteType::TwoFiftySixth => 0.015625,
        }
    }
}

/// Resolve a note's length in quarter-note units.
///
/// `table[name] * tuplet_normal / tuplet_actual`, times 1.5 when dotted.
///
/// # Examples
/// ```
/// use tabmidi::duration::resolve_duration;
///
/// // Dotted eighth
/// assert_eq!(resolve_duration("eighth", 1, 1, true).unwrap(), 0.75);
/// // Quarter-note triplet: 3 in the time of 2
/// assert!((resolve_duration("quarter", 2, 3, false).unwrap() - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn resolve_duration(
    name: &str,
    tuplet_normal: u32,
    tuplet_actual: u32,
    dotted: bool,
) -> Result<f64, TabError> {
    let note_type =
        NoteType::from_name(name).ok_or_else(|| TabError::UnknownDuration(name.to_string()))?;
    let base = note_type.quarters() * tuplet_normal as f64 / tuplet_actual as f64;
    Ok(if dotted { base * 1.5 } else { base })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_values() {
        let expected = [
            ("whole", 4.0),
            ("half", 2.0),
            ("quarter", 1.0),
            ("eighth", 0.5),
            ("16th", 0.25),
            ("32nd", 0.125),
            ("64th", 0.0625),
            ("128th", 0.03125),
            ("256th", 0.015625),
        ];
        for (name, quarters) in expected {
            assert_eq!(resolve_duration(name, 1, 1, false).unwrap(), quarters, "{}", name);
        }
    }

    #[test]
    fn test_dotted() {
        assert_eq!(resolve_duration("quarter", 1, 1, true).unwrap(), 1.5);
        assert_eq!(resolve_duration("half", 1, 1, true).unwrap(), 3.0);
    }

    #[test]
    fn test_tuplets() {
        // Eighth-note triplet: three fill one quarter
        let triplet = resolve_duration("eighth", 2, 3, false).unwrap();
        assert!((triplet * 3.0 - 1.0).abs() < 1e-12);

        // Quintuplet sixteenths: five fill one quarter
        let quintuplet = resolve_duration("16th", 4, 5, false).unwrap();
        assert!((quintuplet * 5.0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_32th_alias() {
        assert_eq!(NoteType::from_name("32th"), Some(NoteType::ThirtySecond));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            resolve_duration("breve", 1, 1, false),
            Err(TabError::UnknownDuration("breve".to_string()))
        );
    }
}
