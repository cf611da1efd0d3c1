//! The catalog of area kinds: how each one is sized from a parent mark,
//! where it proposes new marks, and how it is written into the grid.

use serde::{Deserialize, Serialize};

use crate::dice::Dice;
use crate::grid::{Grid, TileFlags};
use crate::terrain::{TerrainRules, TileKind};
use crate::types::{AreaId, Direction, Pos, Rect};

use super::config::BuilderConfig;
use super::mark::{Mark, MarkState};
use super::patterns::{
    ALT_ROOM_A, ALT_ROOM_B, ALT_ROOM_C, ALT_ROOM_D, CHAPEL, COLONNADE, CROSS, CRYPT,
    MONASTIC_CELLS, OCTAGON, RoomPattern, SPIDER, STAR, TEMPLE, WHEEL,
};
use super::shape::{Annulus, AnnulusEnd, Circle, PatternPlacement, Quadrant, Shape};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    RectRoom,
    LinearCorridor,
    CircleRoom,
    /// A quarter-ring corridor that turns ninety degrees.
    AnnulusCorridor,
    Temple,
    Crypt,
    Star,
    Spider,
    Wheel,
    MonasticCells,
    Cross,
    Colonnade,
    Chapel,
    Octagon,
    AltRoomA,
    AltRoomB,
    AltRoomC,
    AltRoomD,
}

impl AreaKind {
    pub const ALL: [AreaKind; 18] = [
        AreaKind::RectRoom,
        AreaKind::LinearCorridor,
        AreaKind::CircleRoom,
        AreaKind::AnnulusCorridor,
        AreaKind::Temple,
        AreaKind::Crypt,
        AreaKind::Star,
        AreaKind::Spider,
        AreaKind::Wheel,
        AreaKind::MonasticCells,
        AreaKind::Cross,
        AreaKind::Colonnade,
        AreaKind::Chapel,
        AreaKind::Octagon,
        AreaKind::AltRoomA,
        AreaKind::AltRoomB,
        AreaKind::AltRoomC,
        AreaKind::AltRoomD,
    ];

    /// Fixed layout for pattern rooms, `None` for the parametric kinds.
    pub fn pattern(self) -> Option<&'static RoomPattern> {
        let pattern = match self {
            AreaKind::RectRoom
            | AreaKind::LinearCorridor
            | AreaKind::CircleRoom
            | AreaKind::AnnulusCorridor => return None,
            AreaKind::Temple => &TEMPLE,
            AreaKind::Crypt => &CRYPT,
            AreaKind::Star => &STAR,
            AreaKind::Spider => &SPIDER,
            AreaKind::Wheel => &WHEEL,
            AreaKind::MonasticCells => &MONASTIC_CELLS,
            AreaKind::Cross => &CROSS,
            AreaKind::Colonnade => &COLONNADE,
            AreaKind::Chapel => &CHAPEL,
            AreaKind::Octagon => &OCTAGON,
            AreaKind::AltRoomA => &ALT_ROOM_A,
            AreaKind::AltRoomB => &ALT_ROOM_B,
            AreaKind::AltRoomC => &ALT_ROOM_C,
            AreaKind::AltRoomD => &ALT_ROOM_D,
        };
        Some(pattern)
    }
}

/// Address of a mark: the area that owns it and its slot in that area's list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkRef {
    pub area: AreaId,
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct DungeonArea {
    pub id: AreaId,
    pub kind: AreaKind,
    pub shape: Shape,
    /// Mark this area grew from; `None` for the root area.
    pub parent: Option<MarkRef>,
    /// Cell of the spawning mark, a doorway on this area's border.
    pub entry: Pos,
    /// Direction the spawning mark pointed, i.e. into this area.
    pub entry_dir: Direction,
    pub marks: Vec<Mark>,
    pub devoured: u64,
}

impl DungeonArea {
    pub fn new(kind: AreaKind, shape: Shape, parent: Option<MarkRef>, entry: &Mark) -> Self {
        let devoured = devoured_area(kind, &shape);
        Self {
            id: AreaId::default(),
            kind,
            shape,
            parent,
            entry: entry.pos,
            entry_dir: entry.dir,
            marks: Vec::new(),
            devoured,
        }
    }

    /// Writes floors and walls for the footprint, reserves it with `NOT_FREE`
    /// and opens the entry as a door.
    ///
    /// Walls never overwrite floor or door tiles, so an area attached to a
    /// shared wall keeps its neighbour's doorways intact. The root area has
    /// no parent and therefore no door at its entry cell.
    pub fn flush_to_map<R: TerrainRules>(&self, grid: &mut Grid, rules: &R) {
        let floor = rules.translate_tile(TileKind::Floor);
        let wall = rules.translate_tile(TileKind::Wall);
        let door = rules.translate_tile(TileKind::Door);
        let void = rules.translate_tile(TileKind::Void);

        for cell in self.shape.cells() {
            let Some(tile) = grid.get_tile_mut(cell) else {
                continue;
            };
            tile.flags.insert(TileFlags::NOT_FREE);
            if self.shape.is_floor_point(cell) {
                tile.background = floor;
                tile.foreground = void;
            } else if tile.background != floor && tile.foreground != door {
                tile.background = wall;
            }
        }

        if self.parent.is_some() {
            grid.set_background(self.entry, floor);
            grid.set_foreground(self.entry, door);
        }
    }

    /// Paints every unused mark's final state into the first extension slot.
    pub fn flush_marks<R: TerrainRules>(&self, grid: &mut Grid, rules: &R) {
        for mark in &self.marks {
            let kind = match mark.state() {
                MarkState::AreaGenerator => continue,
                MarkState::Undefined => TileKind::MarkUndefined,
                MarkState::RetriesExhausted => TileKind::MarkExhausted,
                MarkState::PointsToOtherArea => TileKind::MarkPointsToOther,
            };
            if let Some(tile) = grid.get_tile_mut(mark.pos) {
                tile.extensions[0] = rules.translate_tile(kind);
            }
        }
    }
}

/// Coverage credited to an area: its footprint plus a bonus for sparse patterns.
pub fn devoured_area(kind: AreaKind, shape: &Shape) -> u64 {
    let bonus = kind.pattern().map_or(0, |pattern| pattern.bonus);
    shape.cells().count() as u64 + bonus
}

/// Sizes a candidate area of `kind` so that `mark` sits on its border.
///
/// Returns `None` when the mark would not end up as a wall cell with floor
/// directly beyond it, which is the only way a doorway can connect.
pub fn build_area(
    kind: AreaKind,
    mark: &Mark,
    config: &BuilderConfig,
    dice: &mut Dice,
) -> Option<Shape> {
    if !mark.dir.is_cardinal() {
        return None;
    }
    let shape = match kind {
        AreaKind::RectRoom => build_rect(
            mark,
            (config.corridor_width_bottom_limit, config.area_size_limit),
            (config.area_size_bottom_limit, config.area_size_limit),
            dice,
        ),
        AreaKind::LinearCorridor => build_rect(
            mark,
            (config.corridor_width_bottom_limit, config.corridor_width_limit),
            (config.corridor_length_bottom_limit, config.corridor_length_limit),
            dice,
        ),
        AreaKind::CircleRoom => build_circle(mark, config, dice),
        AreaKind::AnnulusCorridor => build_annulus(mark, config, dice),
        _ => build_pattern(kind.pattern()?, mark, dice)?,
    };
    shape.accepts_door(mark.pos, mark.dir).then_some(shape)
}

/// `across` spans the side holding the mark, `along` runs in the mark's direction.
fn build_rect(mark: &Mark, across: (i32, i32), along: (i32, i32), dice: &mut Dice) -> Shape {
    let across = dice.range(across.0, across.1);
    let along = dice.range(along.0, along.1);
    let offset = dice.range(1, across - 2);
    let Pos { x, y } = mark.pos;
    let rect = match mark.dir {
        Direction::North => Rect::new(x - offset, y - along + 1, across, along),
        Direction::South => Rect::new(x - offset, y, across, along),
        Direction::East => Rect::new(x, y - offset, along, across),
        _ => Rect::new(x - along + 1, y - offset, along, across),
    };
    Shape::Rect(rect)
}

fn build_circle(mark: &Mark, config: &BuilderConfig, dice: &mut Dice) -> Shape {
    let low = (config.area_size_bottom_limit / 2).max(2);
    let radius = dice.range(low, (config.area_size_limit / 2).max(low));
    let (dx, dy) = mark.dir.delta();
    Shape::Circle(Circle { center: mark.pos.offset(dx * radius, dy * radius), radius })
}

/// Below this a quarter ring's floor band pinches to diagonal-only contacts.
const MIN_ANNULUS_THICKNESS: i32 = 4;

fn build_annulus(mark: &Mark, config: &BuilderConfig, dice: &mut Dice) -> Shape {
    let low = config.corridor_width_bottom_limit.max(MIN_ANNULUS_THICKNESS);
    let thickness = dice.range(low, config.corridor_width_limit.max(low));
    let outer = dice.range(thickness + 3, config.area_size_limit.max(thickness + 3));
    let inner = outer - thickness;
    let (dx, dy) = mark.dir.delta();
    let along = dice.range(inner + 1, outer - 2);
    let (quadrant, center) = if mark.dir.is_vertical() {
        let sx = dice.sign();
        (Quadrant { sx, sy: dy }, mark.pos.offset(-sx * along, 0))
    } else {
        let sy = dice.sign();
        (Quadrant { sx: dx, sy }, mark.pos.offset(0, -sy * along))
    };
    Shape::Annulus(Annulus { center, inner, outer, quadrant })
}

fn build_pattern(pattern: &'static RoomPattern, mark: &Mark, dice: &mut Dice) -> Option<Shape> {
    let doors = pattern.doors_facing(mark.dir.opposite());
    let door = dice.pick(&doors)?;
    let origin = mark.pos.offset(-door.x, -door.y);
    Some(Shape::Pattern(PatternPlacement { origin, pattern }))
}

/// A new mark may not reuse the entry cell or a sibling's cell.
pub fn is_allowed_mark(pos: Pos, entry: Pos, siblings: &[Mark]) -> bool {
    pos != entry && siblings.iter().all(|mark| mark.pos != pos)
}

/// Proposes the exits of a freshly accepted area.
pub fn generate_marks(area: &DungeonArea, config: &BuilderConfig, dice: &mut Dice) -> Vec<Mark> {
    let max_marks = config.max_marks_per_area as i32;
    let mut marks: Vec<Mark> = Vec::new();
    match area.shape {
        Shape::Rect(rect) => {
            let count = match area.kind {
                AreaKind::LinearCorridor => dice.range(1, max_marks.min(2)),
                _ => dice.range(1, max_marks),
            };
            for _ in 0..count {
                let found = search_mark(area, &marks, config, || {
                    let side = if area.kind == AreaKind::LinearCorridor && dice.chance(75) {
                        area.entry_dir
                    } else {
                        Direction::CARDINALS[dice.below(4)]
                    };
                    (rect_side_cell(rect, side, dice), side)
                });
                marks.extend(found.map(|(pos, dir)| Mark::new(pos, dir, config.mark_retries)));
            }
        }
        Shape::Circle(circle) => {
            for _ in 0..dice.range(1, max_marks.min(3)) {
                let found = search_mark(area, &marks, config, || {
                    let side = Direction::CARDINALS[dice.below(4)];
                    (circle.extreme(side), side)
                });
                marks.extend(found.map(|(pos, dir)| Mark::new(pos, dir, config.mark_retries)));
            }
        }
        Shape::Annulus(annulus) => {
            let exit = if area.entry_dir.is_vertical() {
                AnnulusEnd::Vertical
            } else {
                AnnulusEnd::Horizontal
            };
            let (low, high) = annulus.door_offsets();
            let found = search_mark(area, &marks, config, || {
                (annulus.end_cell(exit, dice.range(low, high)), annulus.facing(exit))
            });
            marks.extend(found.map(|(pos, dir)| Mark::new(pos, dir, config.mark_retries)));
        }
        Shape::Pattern(placement) => {
            let doors = placement.doors();
            let limit = (doors.len() as i32 - 1).min(max_marks);
            for _ in 0..dice.range(1, limit.max(1)) {
                let found = search_mark(area, &marks, config, || {
                    let index = dice.below(doors.len());
                    doors.get(index).copied().unwrap_or((area.entry, area.entry_dir))
                });
                marks.extend(found.map(|(pos, dir)| Mark::new(pos, dir, config.mark_retries)));
            }
        }
    }
    marks
}

/// Retries `propose` until it yields an allowed doorway or the search limit runs out.
fn search_mark(
    area: &DungeonArea,
    siblings: &[Mark],
    config: &BuilderConfig,
    mut propose: impl FnMut() -> (Pos, Direction),
) -> Option<(Pos, Direction)> {
    (0..config.right_mark_search_limit).map(|_| propose()).find(|&(pos, dir)| {
        is_allowed_mark(pos, area.entry, siblings) && area.shape.accepts_door(pos, dir.opposite())
    })
}

/// Random non-corner cell on one side of `rect`.
fn rect_side_cell(rect: Rect, side: Direction, dice: &mut Dice) -> Pos {
    let across = dice.range(1, rect.width - 2);
    let down = dice.range(1, rect.height - 2);
    match side {
        Direction::North => Pos::new(rect.left + across, rect.top),
        Direction::South => Pos::new(rect.left + across, rect.bottom()),
        Direction::East => Pos::new(rect.right(), rect.top + down),
        _ => Pos::new(rect.left, rect.top + down),
    }
}
