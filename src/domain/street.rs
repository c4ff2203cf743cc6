// ============================================================
// Layer 3 — Street Domain Type
// ============================================================
// A poker hand is played over four betting rounds ("streets").
// Each street has its own feature encoding and therefore its
// own independently trained network, addressed by name.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of distinct starting-hand classes: 13 pairs,
/// 78 suited and 78 offsuit combinations.
pub const HAND_CLASS_COUNT: usize = 169;

/// One of the four betting rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    /// The network name used for this street's checkpoint directory.
    pub fn name(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop    => "flop",
            Street::Turn    => "turn",
            Street::River   => "river",
        }
    }

    /// Feature width the encoder is known to produce for this street.
    /// Only the preflop encoding is fixed; postflop widths come from the data.
    pub fn expected_features(self) -> Option<usize> {
        match self {
            Street::Preflop => Some(15),
            _               => None,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Street {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Street::ALL
            .into_iter()
            .find(|street| street.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown street '{s}' (expected preflop, flop, turn or river)"))
    }
}
