//! Dungeon generation: areas grown outward from marks on each other's walls.
//!
//! The builder keeps a depth-first stack of open marks. Each mark gets a
//! bounded number of attempts to host a new area; an accepted area is
//! written into the grid at once and contributes its own marks to the stack.

pub mod area;
pub mod config;
pub mod mark;
pub mod patterns;
pub mod shape;

mod builder;
mod error;
mod index;

pub use area::{AreaKind, DungeonArea, MarkRef};
pub use builder::{BuildReport, DungeonBuilder};
pub use config::{AreaWeights, BuilderConfig};
pub use error::{AreaError, BuildError, ConfigError};
pub use mark::{Mark, MarkState};
pub use shape::{Shape, intersects};
