use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mood tag attached to each placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Mood {
    Happy,
    Sad,
    #[default]
    Calm,
    Energetic,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Calm, Mood::Energetic];

    pub const fn index(self) -> u8 {
        match self {
            Mood::Happy => 0,
            Mood::Sad => 1,
            Mood::Calm => 2,
            Mood::Energetic => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Calm => "calm",
            Mood::Energetic => "energetic",
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.index()
    }
}

impl TryFrom<u8> for Mood {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Mood::from_index(value).ok_or_else(|| format!("unknown mood index {value}"))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = String;

    /// Accepts either the label (`calm`) or the wire index (`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Ok(index) = normalized.parse::<u8>() {
            return Mood::try_from(index);
        }
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label() == normalized)
            .ok_or_else(|| format!("unknown mood {s:?}"))
    }
}
