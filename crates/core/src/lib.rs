pub mod dice;
pub mod dungeon;
pub mod fov;
pub mod grid;
pub mod landscape;
pub mod pathfinding;
pub mod terrain;
pub mod types;

pub use dice::Dice;
pub use dungeon::{
    AreaKind, BuildError, BuildReport, BuilderConfig, ConfigError, DungeonArea, DungeonBuilder,
};
pub use grid::{Grid, PathStatus, Tile, TileFlags};
pub use pathfinding::{PathError, PathResult, PathSearch};
pub use terrain::{BARRIER_COST, TerrainRules, TerrainTable, TileId, TileKind, Walker};
pub use types::*;
