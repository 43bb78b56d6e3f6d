use std::fmt;
use std::str::FromStr;

use crate::error::SketchError;

/// Component weights of the composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub contour: f64,
    pub keypoints: f64,
    pub local: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.contour + self.keypoints + self.local
    }
}

/// Difficulty tier; harder tiers shift weight from gross shape to fine detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn weights(self) -> Weights {
        match self {
            Difficulty::Easy => Weights { contour: 0.65, keypoints: 0.30, local: 0.05 },
            Difficulty::Medium => Weights { contour: 0.60, keypoints: 0.33, local: 0.07 },
            Difficulty::Hard => Weights { contour: 0.55, keypoints: 0.35, local: 0.10 },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(SketchError::InvalidConfig(format!("unknown difficulty '{other}'"))),
        }
    }
}
