//! Dynamics markings to MIDI velocity.

use crate::error::TabError;

/// Loudness marking, softest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Dynamics {
    Ppp,
    Pp,
    P,
    Mp,
    Mf,
    #[default]
    F,
    Ff,
    Fff,
}

impl Dynamics {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ppp" => Some(Dynamics::Ppp),
            "pp" => Some(Dynamics::Pp),
            "p" => Some(Dynamics::P),
            "mp" => Some(Dynamics::Mp),
            "mf" => Some(Dynamics::Mf),
            "f" => Some(Dynamics::F),
            "ff" => Some(Dynamics::Ff),
            "fff" => Some(Dynamics::Fff),
            _ => None,
        }
    }

    /// `16 * rank - 1` with `ppp` at rank 1, so ppp = 15 and fff = 127.
    pub fn velocity(self) -> u8 {
        let rank = self as u8 + 1;
        16 * rank - 1
    }
}

/// Velocity for an optional marking, falling back to `default` when absent.
///
/// # Examples
/// ```
/// use tabmidi::dynamics::{resolve_velocity, Dynamics};
///
/// assert_eq!(resolve_velocity(Some("pp"), Dynamics::F).unwrap(), 31);
/// assert_eq!(resolve_velocity(None, Dynamics::F).unwrap(), 95);
/// assert!(resolve_velocity(Some("sfz"), Dynamics::F).is_err());
/// ```
pub fn resolve_velocity(marking: Option<&str>, default: Dynamics) -> Result<u8, TabError> {
    match marking {
        None => Ok(default.velocity()),
        Some(name) => Dynamics::from_name(name)
            .map(Dynamics::velocity)
            .ok_or_else(|| TabError::UnknownDynamics(name.to_string())),
    }
}
