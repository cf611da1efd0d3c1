//! Bounded A* over the grid, keeping its bookkeeping on the tiles themselves.
//!
//! A search leaves `pf_status`, `pf_prev` and `pf_cost` behind on every tile
//! it touched. The grid remembers that, and the next search refuses to run
//! until [`PathSearch::clear`] has wiped it.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::grid::{Grid, PathStatus};
use crate::terrain::{BARRIER_COST, TerrainRules};
use crate::types::{Direction, Pos};

/// Fixed-point scale for the ordered open set.
const SCALE: f32 = 1000.0;
/// Step multiplier indexed by compass parity: even indices are orthogonal.
const STEP_FACTOR: [f32; 2] = [1.0, 1.42];

pub const DEFAULT_OPEN_CAPACITY: usize = 500;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path state from a previous search was not cleared")]
    StaleSearchState,

    #[error("{pos:?} is outside the grid")]
    OutOfBounds { pos: Pos },

    #[error("back-pointer walk from {from:?} did not reach the source")]
    CorruptPath { from: Pos },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Steps from source to destination.
    pub distance: usize,
    pub cost: f32,
    /// First cell to move to; the source itself when already there.
    pub next_step: Pos,
    /// Cells after the source up to and including the destination.
    pub path: Option<Vec<Pos>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u64,
    h: u64,
    /// Distance off the `src`-`dst` line; breaks ties toward straighter paths.
    cross: u64,
    y: i32,
    x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathSearch {
    capacity: usize,
}

impl Default for PathSearch {
    fn default() -> Self {
        Self { capacity: DEFAULT_OPEN_CAPACITY }
    }
}

impl PathSearch {
    /// `capacity` bounds the open set; the worst entries are dropped beyond it.
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self, grid: &mut Grid) {
        grid.clear_path_state();
    }

    /// Cheapest route from `src` to `dst` for `creature`, or `None` when
    /// `dst` cannot be reached.
    pub fn search<R: TerrainRules>(
        &self,
        grid: &mut Grid,
        rules: &R,
        src: Pos,
        dst: Pos,
        creature: &R::Creature,
        need_path: bool,
    ) -> Result<Option<PathResult>, PathError> {
        if grid.path_state_dirty() {
            return Err(PathError::StaleSearchState);
        }
        for pos in [src, dst] {
            if !grid.in_bounds(pos) {
                return Err(PathError::OutOfBounds { pos });
            }
        }
        grid.mark_path_state_dirty();

        if src == dst {
            return Ok(Some(PathResult {
                distance: 0,
                cost: 0.0,
                next_step: src,
                path: need_path.then(Vec::new),
            }));
        }

        let mut open = BTreeSet::new();
        if let Some(tile) = grid.get_tile_mut(src) {
            tile.pf_status = PathStatus::Open;
            tile.pf_cost = 0.0;
            tile.pf_prev = None;
        }
        let min_step = rules.min_step_cost(creature);
        let h = heuristic(src, dst, min_step);
        open.insert(OpenNode { f: h, h, cross: 0, y: src.y, x: src.x });

        while let Some(node) = open.pop_first() {
            let pos = Pos { y: node.y, x: node.x };
            let Some(tile) = grid.get_tile_mut(pos) else {
                continue;
            };
            if tile.pf_status != PathStatus::Open {
                continue;
            }
            tile.pf_status = PathStatus::Closed;
            let g = tile.pf_cost;
            if pos == dst {
                return reconstruct(grid, src, dst, g, need_path).map(Some);
            }

            for (index, dir) in Direction::COMPASS.into_iter().enumerate() {
                let next = pos.step(dir);
                let Some(tile) = grid.get_tile(next) else {
                    continue;
                };
                if matches!(tile.pf_status, PathStatus::Closed | PathStatus::Barrier) {
                    continue;
                }
                let cost = rules.path_tile_cost(creature, next, tile);
                let Some(tile) = grid.get_tile_mut(next) else {
                    continue;
                };
                if cost >= BARRIER_COST {
                    tile.pf_status = PathStatus::Barrier;
                    continue;
                }
                let tentative = g + cost * STEP_FACTOR[index % 2];
                if tile.pf_status == PathStatus::Open && tentative >= tile.pf_cost {
                    continue;
                }
                tile.pf_status = PathStatus::Open;
                tile.pf_cost = tentative;
                tile.pf_prev = Some(pos);
                let h = heuristic(next, dst, min_step);
                let cross = deviation(src, next, dst);
                let f = scaled(tentative) + h;
                open.insert(OpenNode { f, h, cross, y: next.y, x: next.x });

                if open.len() > self.capacity
                    && let Some(worst) = open.pop_last()
                {
                    forget(grid, worst);
                }
            }
        }
        Ok(None)
    }
}

/// Drops an evicted node's tile back to unvisited if that entry was its live one.
fn forget(grid: &mut Grid, node: OpenNode) {
    let Some(tile) = grid.get_tile_mut(Pos { y: node.y, x: node.x }) else {
        return;
    };
    if tile.pf_status == PathStatus::Open && scaled(tile.pf_cost) + node.h == node.f {
        tile.pf_status = PathStatus::Unvisited;
        tile.pf_prev = None;
        tile.pf_cost = 0.0;
    }
}

fn reconstruct(
    grid: &Grid,
    src: Pos,
    dst: Pos,
    cost: f32,
    need_path: bool,
) -> Result<PathResult, PathError> {
    let limit = grid.width() * grid.height();
    let mut steps = vec![dst];
    let mut current = dst;
    while let Some(prev) = grid.get_tile(current).and_then(|tile| tile.pf_prev) {
        if prev == src {
            break;
        }
        if steps.len() >= limit {
            return Err(PathError::CorruptPath { from: dst });
        }
        steps.push(prev);
        current = prev;
    }
    if grid.get_tile(current).and_then(|tile| tile.pf_prev) != Some(src) {
        return Err(PathError::CorruptPath { from: dst });
    }
    steps.reverse();
    Ok(PathResult {
        distance: steps.len(),
        cost,
        next_step: steps[0],
        path: need_path.then_some(steps),
    })
}

fn scaled(cost: f32) -> u64 {
    (cost * SCALE).round() as u64
}

/// Octile distance to `dst` priced at the cheapest passable step, so it
/// never overestimates and the first time `dst` is popped its cost is final.
fn heuristic(pos: Pos, dst: Pos, min_step: f32) -> u64 {
    let dx = pos.x.abs_diff(dst.x);
    let dy = pos.y.abs_diff(dst.y);
    let (low, high) = (dx.min(dy), dx.max(dy));
    let octile = (high - low) as f32 * STEP_FACTOR[0] + low as f32 * STEP_FACTOR[1];
    scaled(octile * min_step)
}

/// Cross product of `pos - dst` with `src - dst`.
fn deviation(src: Pos, pos: Pos, dst: Pos) -> u64 {
    let (ax, ay) = (i64::from(pos.x - dst.x), i64::from(pos.y - dst.y));
    let (bx, by) = (i64::from(src.x - dst.x), i64::from(src.y - dst.y));
    (ax * by - bx * ay).unsigned_abs()
}
