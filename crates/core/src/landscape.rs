//! Outdoor map utilities: borders, lakes and rivers.

use std::collections::BTreeSet;

use crate::dice::Dice;
use crate::grid::Grid;
use crate::terrain::{TerrainRules, TileKind, is_barrier};
use crate::types::{Direction, Pos, Rect};

/// Frames `rect` with `thickness` rings of impassable border.
pub fn draw_border<R: TerrainRules>(grid: &mut Grid, rules: &R, rect: Rect, thickness: i32) {
    let border = rules.translate_tile(TileKind::Border);
    let Some(rect) = rect.intersection(grid.bounds()) else {
        return;
    };
    for pos in rect.positions() {
        let inset = (pos.x - rect.left)
            .min(rect.right() - pos.x)
            .min(pos.y - rect.top)
            .min(rect.bottom() - pos.y);
        if inset < thickness {
            grid.set_background(pos, border);
        }
    }
}

/// Grows a random blob of up to `size` water cells from `centre` and
/// returns how many cells it covers.
///
/// Cells whose eight neighbours are all lake become deep water; passable
/// cells just outside the lake become sand.
pub fn grow_lake<R: TerrainRules>(
    grid: &mut Grid,
    rules: &R,
    dice: &mut Dice,
    centre: Pos,
    size: usize,
) -> usize {
    let mut lake = BTreeSet::new();
    let mut frontier = vec![centre];
    while lake.len() < size && !frontier.is_empty() {
        let pos = frontier.swap_remove(dice.below(frontier.len()));
        if lake.contains(&pos) || is_barrier(grid, rules, pos) {
            continue;
        }
        lake.insert(pos);
        frontier.extend(grid.neighbours4(pos).filter(|next| !lake.contains(next)));
    }

    let water = rules.translate_tile(TileKind::Water);
    let deep = rules.translate_tile(TileKind::DeepWater);
    let sand = rules.translate_tile(TileKind::Sand);
    let void = rules.translate_tile(TileKind::Void);

    let mut shore = BTreeSet::new();
    for &pos in &lake {
        let enclosed = Direction::COMPASS.iter().all(|&dir| lake.contains(&pos.step(dir)));
        grid.set_background(pos, if enclosed { deep } else { water });
        grid.set_foreground(pos, void);
        shore.extend(grid.neighbours8(pos).filter(|next| !lake.contains(next)));
    }
    for pos in shore {
        if !is_barrier(grid, rules, pos) {
            grid.set_background(pos, sand);
        }
    }
    lake.len()
}

/// Meanders a river of `width` cells from `from` toward `to`.
///
/// Each step heads for the target, drifting sideways a quarter of the time.
/// Road cells under the river become bridges. Returns the centre line,
/// which ends at `to` unless the step budget ran out first.
pub fn carve_river<R: TerrainRules>(
    grid: &mut Grid,
    rules: &R,
    dice: &mut Dice,
    from: Pos,
    to: Pos,
    width: i32,
) -> Vec<Pos> {
    let bounds = grid.bounds();
    let budget = 4 * (grid.width() + grid.height());
    let water = rules.translate_tile(TileKind::Water);
    let road = rules.translate_tile(TileKind::Road);
    let bridge = rules.translate_tile(TileKind::Bridge);
    let border = rules.translate_tile(TileKind::Border);
    let void = rules.translate_tile(TileKind::Void);

    let mut course = Vec::new();
    let mut current = from;
    for _ in 0..budget {
        if !bounds.contains(current) {
            break;
        }
        course.push(current);
        let half = width.max(1) / 2;
        let brush = Rect::new(current.x - half, current.y - half, width.max(1), width.max(1));
        for pos in brush.positions() {
            let Some(tile) = grid.get_tile_mut(pos) else {
                continue;
            };
            if tile.background == road {
                tile.background = bridge;
            } else if tile.background != border && tile.background != bridge {
                tile.background = water;
                tile.foreground = void;
            }
        }
        if current == to {
            break;
        }

        let (gap_x, gap_y) = (to.x - current.x, to.y - current.y);
        let (mut dx, mut dy) = (gap_x.signum(), gap_y.signum());
        if dice.chance(25) {
            if gap_x.abs() >= gap_y.abs() {
                dy = dice.sign();
            } else {
                dx = dice.sign();
            }
        }
        let next = current.offset(dx, dy);
        current = Pos {
            y: next.y.clamp(bounds.top, bounds.bottom()),
            x: next.x.clamp(bounds.left, bounds.right()),
        };
    }
    course
}
