//! # Conversion Options
//!
//! Settings that apply to every part of a conversion. They can be loaded from
//! a small YAML document:
//!
//! ```yaml
//! tempo: 120
//! default-dynamics: mf
//! ```
//!
//! Missing keys keep their defaults (120 bpm, `f`). Only voice 1 of each part
//! is ever converted; that is not configurable.

use serde::Deserialize;

use crate::dynamics::Dynamics;
use crate::error::TabError;

/// Tempo marking written at time 0 of every track
pub const DEFAULT_TEMPO: u16 = 120;

/// Voice whose notes are walked; notes in any other voice are dropped.
pub const TRACKED_VOICE: u32 = 1;

/// Raw options for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawOptions {
    tempo: Option<u16>,
    default_dynamics: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Beats per minute for the tempo marking at time 0.
    pub tempo: u16,
    /// Marking used for notes that carry no dynamics of their own.
    pub default_dynamics: Dynamics,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            default_dynamics: Dynamics::default(),
        }
    }
}

impl ConvertOptions {
    /// Parse options from YAML, validating every value.
    pub fn from_yaml(content: &str) -> Result<Self, TabError> {
        // An empty document deserializes to unit, not to a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawOptions =
            serde_yaml::from_str(content).map_err(|e| TabError::Options(e.to_string()))?;

        let tempo = match raw.tempo {
            Some(0) => return Err(TabError::Options("tempo must be positive".to_string())),
            Some(bpm) => bpm,
            None => DEFAULT_TEMPO,
        };

        let default_dynamics = match &raw.default_dynamics {
            Some(name) => Dynamics::from_name(name).ok_or_else(|| {
                TabError::Options(format!("Unknown default dynamics: {}", name))
            })?,
            None => Dynamics::default(),
        };

        Ok(Self {
            tempo,
            default_dynamics,
        })
    }
}
