//! Field of view by recursive shadowcasting.
//!
//! One scan routine serves all eight octants through a transform table. A
//! viewer that just moved only sees the half plane ahead of it; a viewer
//! with no heading sees all around. Results land in the grid's `SEEN` flags
//! and accumulate until the caller runs [`reset`].

use crate::grid::{Grid, TileFlags};
use crate::terrain::{TerrainRules, is_block_los};
use crate::types::{Direction, Pos, Rect};

/// Slack added to the radius so the visible disc has no axis-aligned notches.
pub const LOS_DELTA: f32 = 0.2;

/// Octant `k` spans `COMPASS[k]` to `COMPASS[k + 1]`. A cell `col` cells
/// across and `row` cells out maps to `dx = col * xx + row * xy` and
/// `dy = col * yx + row * yy`.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, -1],
    [0, 1, -1, 0],
    [0, 1, 1, 0],
    [1, 0, 0, 1],
    [-1, 0, 0, 1],
    [0, -1, 1, 0],
    [0, -1, -1, 0],
    [-1, 0, 0, -1],
];

/// Marks every cell visible from `origin` as `SEEN`, restricted to `viewport`.
///
/// Does not clear earlier results; see [`reset`].
pub fn fov_start<R: TerrainRules>(
    grid: &mut Grid,
    rules: &R,
    origin: Pos,
    radius: i32,
    last_move: Direction,
    viewport: Rect,
) {
    let mut caster = Caster { grid, rules, origin, radius: radius.max(0), viewport };
    caster.mark(origin);
    for neighbour in Direction::COMPASS.map(|dir| origin.step(dir)) {
        if caster.within_radius(neighbour.x - origin.x, neighbour.y - origin.y) {
            caster.mark(neighbour);
        }
    }

    let (rays, octants) = match last_move.index() {
        None => ((0..8).collect::<Vec<_>>(), (0..8).collect::<Vec<_>>()),
        Some(heading) => (
            (0..5).map(|k| (heading + 6 + k) % 8).collect(),
            (0..4).map(|k| (heading + 6 + k) % 8).collect(),
        ),
    };
    for ray in rays {
        caster.cast_ray(Direction::from_index(ray));
    }
    for octant in octants {
        caster.scan(octant, 1, Slope::new(1, 1), Slope::new(0, 1));
    }
}

/// Clears `SEEN` inside `viewport`.
pub fn reset(grid: &mut Grid, viewport: Rect) {
    grid.reset_seen(viewport);
}

/// Folds the current `SEEN` cells into the permanent `VISITED` memory.
pub fn remember(grid: &mut Grid, viewport: Rect) {
    grid.remember_seen(viewport);
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

struct Caster<'a, R> {
    grid: &'a mut Grid,
    rules: &'a R,
    origin: Pos,
    radius: i32,
    viewport: Rect,
}

impl<R: TerrainRules> Caster<'_, R> {
    fn within_radius(&self, dx: i32, dy: i32) -> bool {
        let reach = self.radius as f32 + LOS_DELTA;
        (dx * dx + dy * dy) as f32 <= reach * reach
    }

    fn blocks(&self, pos: Pos) -> bool {
        is_block_los(self.grid, self.rules, pos)
    }

    fn mark(&mut self, pos: Pos) {
        if !self.viewport.contains(pos) {
            return;
        }
        if let Some(tile) = self.grid.get_tile_mut(pos) {
            tile.flags.insert(TileFlags::SEEN);
        }
    }

    /// Walks straight out until the radius ends or a blocker has been marked.
    fn cast_ray(&mut self, dir: Direction) {
        let (dx, dy) = dir.delta();
        for step in 1..=self.radius {
            if !self.within_radius(dx * step, dy * step) {
                break;
            }
            let pos = self.origin.offset(dx * step, dy * step);
            self.mark(pos);
            if self.blocks(pos) {
                break;
            }
        }
    }

    /// Scans row `dist` of `octant` between the `start` and `end` slopes,
    /// recursing past each transparent run that ends in a blocker.
    fn scan(&mut self, octant: usize, dist: i32, start: Slope, end: Slope) {
        if dist > self.radius {
            return;
        }
        let [xx, xy, yx, yy] = OCTANTS[octant];
        let mut blocked = false;
        let mut cur_start = start;
        for col in (0..=dist).rev() {
            let top = Slope::new(2 * col + 1, 2 * dist - 1);
            let bot = Slope::new(2 * col - 1, 2 * dist + 1);
            if !(cur_start.greater_or_equal(&bot) && top.greater_than(&end)) {
                continue;
            }
            let pos = self.origin.offset(col * xx + dist * xy, col * yx + dist * yy);
            if self.within_radius(col, dist) {
                self.mark(pos);
            }
            if self.blocks(pos) {
                if !blocked {
                    self.scan(octant, dist + 1, cur_start, top);
                    blocked = true;
                }
                cur_start = bot;
            } else if blocked {
                blocked = false;
            }
        }
        if !blocked {
            self.scan(octant, dist + 1, cur_start, end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::terrain::{TerrainTable, TileKind};

    fn open_field(size: usize) -> (Grid, TerrainTable) {
        let table = TerrainTable::default();
        let floor = table.translate_tile(TileKind::Floor);
        let fill = Tile::new(floor, table.translate_tile(TileKind::Void));
        (Grid::new(size, size, fill), table)
    }

    fn wall(grid: &mut Grid, table: &TerrainTable, pos: Pos) {
        grid.set_background(pos, table.translate_tile(TileKind::Wall));
    }

    #[test]
    fn octant_table_spans_neighbouring_compass_points() {
        for (k, [xx, xy, yx, yy]) in OCTANTS.into_iter().enumerate() {
            let axis = Direction::from_delta(xy, yy);
            let diagonal = Direction::from_delta(xx + xy, yx + yy);
            let mut ends = [axis, diagonal].map(|dir| dir.index());
            ends.sort();
            let mut expected = [Some(k), Some((k + 1) % 8)];
            expected.sort();
            assert_eq!(ends, expected, "octant {k}");
        }
    }

    #[test]
    fn open_field_sees_the_whole_disc() {
        let (mut grid, table) = open_field(21);
        let origin = Pos::new(10, 10);
        let bounds = grid.bounds();
        fov_start(&mut grid, &table, origin, 6, Direction::None, bounds);
        for pos in grid.positions() {
            let distance = pos.distance_squared(origin) as f32;
            let inside = distance <= (6.0 + LOS_DELTA) * (6.0 + LOS_DELTA);
            assert_eq!(grid.is_seen(pos), inside, "{pos:?}");
        }
    }

    #[test]
    fn wall_hides_the_cells_behind_it() {
        let (mut grid, table) = open_field(15);
        let origin = Pos::new(5, 5);
        wall(&mut grid, &table, Pos::new(7, 5));
        let bounds = grid.bounds();
        fov_start(&mut grid, &table, origin, 10, Direction::None, bounds);
        assert!(grid.is_seen(Pos::new(6, 5)));
        assert!(grid.is_seen(Pos::new(7, 5)), "the wall itself is visible");
        assert!(!grid.is_seen(Pos::new(8, 5)));
        assert!(!grid.is_seen(Pos::new(11, 5)));
    }

    #[test]
    fn origin_is_seen_even_when_boxed_in() {
        let (mut grid, table) = open_field(9);
        let origin = Pos::new(4, 4);
        for dir in Direction::COMPASS {
            wall(&mut grid, &table, origin.step(dir));
        }
        let bounds = grid.bounds();
        fov_start(&mut grid, &table, origin, 5, Direction::North, bounds);
        assert!(grid.is_seen(origin));
        assert!(!grid.is_seen(Pos::new(4, 1)));
        assert!(!grid.is_seen(Pos::new(4, 7)));
    }

    #[test]
    fn heading_limits_sight_to_the_half_plane_ahead() {
        let (mut grid, table) = open_field(21);
        let origin = Pos::new(10, 10);
        let bounds = grid.bounds();
        fov_start(&mut grid, &table, origin, 8, Direction::East, bounds);
        assert!(grid.is_seen(Pos::new(17, 10)));
        assert!(grid.is_seen(Pos::new(10, 3)), "straight up is on the edge of the cone");
        assert!(grid.is_seen(Pos::new(9, 10)), "adjacent cells are always sensed");
        assert!(!grid.is_seen(Pos::new(5, 10)));
        assert!(!grid.is_seen(Pos::new(6, 6)));
    }

    #[test]
    fn viewport_clips_marking_but_not_occlusion() {
        let (mut grid, table) = open_field(21);
        let viewport = Rect::new(10, 0, 11, 21);
        fov_start(&mut grid, &table, Pos::new(10, 10), 8, Direction::None, viewport);
        assert!(grid.is_seen(Pos::new(15, 10)));
        assert!(!grid.is_seen(Pos::new(5, 10)));

        remember(&mut grid, viewport);
        reset(&mut grid, viewport);
        assert!(!grid.is_seen(Pos::new(15, 10)));
        assert!(grid.is_visited(Pos::new(15, 10)));
    }
}
