use thiserror::Error;

use crate::types::{AreaId, Pos, Rect};

use super::area::MarkRef;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("area weights must sum to exactly 100, got {sum}")]
    WeightSum { sum: u32 },

    #[error("{name} must be at least {min}, got {value}")]
    TooSmall { name: &'static str, min: i64, value: i64 },

    #[error("{name} is a percentage, got {value}")]
    NotAPercent { name: &'static str, value: u32 },

    #[error("{lower} ({low}) exceeds {upper} ({high})")]
    InvertedRange { lower: &'static str, upper: &'static str, low: i32, high: i32 },
}

/// Inconsistency inside the builder's own bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AreaError {
    #[error("area {0:?} is not in the accepted set")]
    MissingArea(AreaId),

    #[error("mark {0:?} does not exist")]
    MissingMark(MarkRef),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("invalid builder config: {0}")]
    Config(#[from] ConfigError),

    #[error("dungeon rect is empty")]
    EmptyRect,

    #[error("dungeon rect {rect:?} does not fit a {width}x{height} grid")]
    RectOutsideGrid { rect: Rect, width: usize, height: usize },

    #[error("start {start:?} lies outside the dungeon rect")]
    StartOutsideRect { start: Pos },

    #[error("coverage stayed at {best_percent:.1}% after {attempts} attempts, needed {target}%")]
    CoverageNotReached { attempts: u32, target: u32, best_percent: f64 },

    #[error("root mark could not be processed: {0}")]
    Internal(#[from] AreaError),
}
