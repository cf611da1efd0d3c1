//! Builder tuning knobs and the area kind weight table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::area::AreaKind;
use super::error::ConfigError;

/// Relative frequency of each area kind, in percent. Must total exactly 100.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaWeights(BTreeMap<AreaKind, u8>);

impl AreaWeights {
    pub fn new(entries: impl IntoIterator<Item = (AreaKind, u8)>) -> Self {
        Self(entries.into_iter().filter(|&(_, weight)| weight > 0).collect())
    }

    pub fn get(&self, kind: AreaKind) -> u8 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: AreaKind, weight: u8) {
        if weight == 0 {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, weight);
        }
    }

    pub fn sum(&self) -> u32 {
        self.0.values().map(|&weight| u32::from(weight)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AreaKind, u8)> + '_ {
        self.0.iter().map(|(&kind, &weight)| (kind, weight))
    }

    /// Kind whose cumulative weight band contains `roll` (0..100).
    pub fn pick(&self, roll: u32) -> Option<AreaKind> {
        let mut upper = 0;
        for (kind, weight) in self.iter() {
            upper += u32::from(weight);
            if roll < upper {
                return Some(kind);
            }
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub seed: u64,
    /// Upper bound on a room side; also caps circle diameter and annulus radius.
    pub area_size_limit: i32,
    pub area_size_bottom_limit: i32,
    pub corridor_width_bottom_limit: i32,
    pub corridor_width_limit: i32,
    pub corridor_length_bottom_limit: i32,
    pub corridor_length_limit: i32,
    /// Placement attempts per mark before it is given up.
    pub mark_retries: u32,
    /// Attempts to find an acceptable cell for each new mark.
    pub right_mark_search_limit: u32,
    pub max_marks_per_area: u32,
    /// Coverage, in percent of the dungeon rect, that ends the build.
    pub devoured_area_bottom_limit: u32,
    pub max_restarts: u32,
    /// Placement attempts allowed in one pass before it is cut short.
    pub max_steps: u64,
    pub startup_area: AreaKind,
    /// Paint terminal mark states into the tiles' first extension slot.
    pub debug_marks: bool,
    pub weights: AreaWeights,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            area_size_limit: 12,
            area_size_bottom_limit: 5,
            corridor_width_bottom_limit: 3,
            corridor_width_limit: 4,
            corridor_length_bottom_limit: 5,
            corridor_length_limit: 16,
            mark_retries: 12,
            right_mark_search_limit: 8,
            max_marks_per_area: 4,
            devoured_area_bottom_limit: 40,
            max_restarts: 32,
            max_steps: 5_000_000,
            startup_area: AreaKind::CircleRoom,
            debug_marks: false,
            weights: AreaWeights::new([
                (AreaKind::RectRoom, 45),
                (AreaKind::LinearCorridor, 25),
                (AreaKind::CircleRoom, 10),
                (AreaKind::AnnulusCorridor, 10),
                (AreaKind::Temple, 2),
                (AreaKind::Crypt, 2),
                (AreaKind::Star, 2),
                (AreaKind::Spider, 2),
                (AreaKind::Wheel, 2),
            ]),
        }
    }
}

impl BuilderConfig {
    /// Dense cellar: rooms, corridors and cell blocks packed to 80% coverage.
    pub fn cellar() -> Self {
        Self {
            devoured_area_bottom_limit: 80,
            weights: AreaWeights::new([
                (AreaKind::RectRoom, 60),
                (AreaKind::LinearCorridor, 20),
                (AreaKind::MonasticCells, 4),
                (AreaKind::AltRoomA, 4),
                (AreaKind::AltRoomB, 4),
                (AreaKind::AltRoomC, 4),
                (AreaKind::AltRoomD, 4),
            ]),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.weights.sum();
        if sum != 100 {
            return Err(ConfigError::WeightSum { sum });
        }

        for (name, min, value) in [
            ("area_size_bottom_limit", 3, i64::from(self.area_size_bottom_limit)),
            ("corridor_width_bottom_limit", 3, i64::from(self.corridor_width_bottom_limit)),
            ("corridor_length_bottom_limit", 3, i64::from(self.corridor_length_bottom_limit)),
            ("mark_retries", 1, i64::from(self.mark_retries)),
            ("right_mark_search_limit", 1, i64::from(self.right_mark_search_limit)),
            ("max_marks_per_area", 1, i64::from(self.max_marks_per_area)),
            ("max_restarts", 1, i64::from(self.max_restarts)),
        ] {
            if value < min {
                return Err(ConfigError::TooSmall { name, min, value });
            }
        }

        for (lower, upper, low, high) in [
            (
                "area_size_bottom_limit",
                "area_size_limit",
                self.area_size_bottom_limit,
                self.area_size_limit,
            ),
            (
                "corridor_width_bottom_limit",
                "corridor_width_limit",
                self.corridor_width_bottom_limit,
                self.corridor_width_limit,
            ),
            (
                "corridor_length_bottom_limit",
                "corridor_length_limit",
                self.corridor_length_bottom_limit,
                self.corridor_length_limit,
            ),
            (
                "corridor_width_bottom_limit",
                "area_size_limit",
                self.corridor_width_bottom_limit,
                self.area_size_limit,
            ),
        ] {
            if low > high {
                return Err(ConfigError::InvertedRange { lower, upper, low, high });
            }
        }

        if self.devoured_area_bottom_limit > 100 {
            return Err(ConfigError::NotAPercent {
                name: "devoured_area_bottom_limit",
                value: self.devoured_area_bottom_limit,
            });
        }
        Ok(())
    }
}
