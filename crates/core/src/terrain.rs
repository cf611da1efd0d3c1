//! Terrain vocabulary and the rules the grid algorithms consult.
//! Generation writes abstract [`TileKind`]s through [`TerrainRules::translate_tile`];
//! FOV and pathfinding only ever ask the rules, never inspect raw ids themselves.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Tile};
use crate::types::Pos;

/// Cost sentinel for impassable tiles. Any cost at or above it is a barrier.
pub const BARRIER_COST: f32 = 10_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Nothing; the empty foreground.
    Void,
    /// Ungenerated solid mass.
    Rock,
    Floor,
    Wall,
    Door,
    Water,
    DeepWater,
    Ground,
    Grass,
    Tree,
    Sand,
    Bridge,
    Road,
    Border,
    MarkUndefined,
    MarkExhausted,
    MarkPointsToOther,
}

/// The narrow contract between the core algorithms and the game layer.
pub trait TerrainRules {
    type Creature: ?Sized;

    fn translate_tile(&self, kind: TileKind) -> TileId;

    fn is_barrier(&self, tile: &Tile) -> bool;

    fn blocks_los(&self, tile: &Tile) -> bool;

    /// Movement cost of entering `tile`; `BARRIER_COST` or more means impassable.
    fn path_tile_cost(&self, creature: &Self::Creature, pos: Pos, tile: &Tile) -> f32;

    /// Lower bound of `path_tile_cost` over every passable tile for `creature`.
    /// A* scales its distance estimate by it; overstating it loses optimality.
    fn min_step_cost(&self, creature: &Self::Creature) -> f32;
}

/// Out-of-grid cells are barriers.
pub fn is_barrier<R: TerrainRules>(grid: &Grid, rules: &R, pos: Pos) -> bool {
    grid.get_tile(pos).is_none_or(|tile| rules.is_barrier(tile))
}

/// Out-of-grid cells block sight.
pub fn is_block_los<R: TerrainRules>(grid: &Grid, rules: &R, pos: Pos) -> bool {
    grid.get_tile(pos).is_none_or(|tile| rules.blocks_los(tile))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainEntry {
    pub kind: TileKind,
    pub glyph: char,
    pub cost: f32,
    #[serde(default)]
    pub barrier: bool,
    #[serde(default)]
    pub blocks_los: bool,
    #[serde(default)]
    pub liquid: bool,
}

impl TerrainEntry {
    fn new(kind: TileKind, glyph: char, cost: f32) -> Self {
        Self { kind, glyph, cost, barrier: false, blocks_los: false, liquid: false }
    }

    fn solid(self) -> Self {
        Self { barrier: true, blocks_los: true, cost: BARRIER_COST, ..self }
    }

    fn opaque(self) -> Self {
        Self { blocks_los: true, ..self }
    }

    fn liquid(self) -> Self {
        Self { barrier: true, liquid: true, cost: BARRIER_COST, ..self }
    }
}

/// Table-driven terrain: the raw id of a tile is its index in `entries`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainTable {
    pub entries: Vec<TerrainEntry>,
}

impl Default for TerrainTable {
    fn default() -> Self {
        use TileKind::*;
        Self {
            entries: vec![
                TerrainEntry::new(Void, ' ', 0.0).solid(),
                TerrainEntry::new(Rock, ' ', 0.0).solid(),
                TerrainEntry::new(Floor, '.', 1.0),
                TerrainEntry::new(Wall, '#', 0.0).solid(),
                TerrainEntry::new(Door, '+', 1.0),
                TerrainEntry::new(Water, '~', 0.0).liquid(),
                TerrainEntry::new(DeepWater, '≈', 0.0).liquid(),
                TerrainEntry::new(Ground, ',', 1.0),
                TerrainEntry::new(Grass, '"', 1.2),
                TerrainEntry::new(Tree, 'T', 3.0).opaque(),
                TerrainEntry::new(Sand, ':', 1.5),
                TerrainEntry::new(Bridge, '=', 1.0),
                TerrainEntry::new(Road, '_', 0.8),
                TerrainEntry::new(Border, '%', 0.0).solid(),
                TerrainEntry::new(MarkUndefined, '?', 0.0).solid(),
                TerrainEntry::new(MarkExhausted, 'x', 0.0).solid(),
                TerrainEntry::new(MarkPointsToOther, '>', 0.0).solid(),
            ],
        }
    }
}

impl TerrainTable {
    pub fn entry(&self, id: TileId) -> Option<&TerrainEntry> {
        self.entries.get(usize::from(id.0))
    }

    pub fn kind_of(&self, id: TileId) -> Option<TileKind> {
        self.entry(id).map(|entry| entry.kind)
    }

    /// Glyph of the visible layer of a tile: foreground when present, else background.
    pub fn glyph(&self, tile: &Tile) -> char {
        let void = self.translate_tile(TileKind::Void);
        let id = if tile.foreground != void { tile.foreground } else { tile.background };
        self.entry(id).map_or('?', |entry| entry.glyph)
    }

    fn layers<'a>(&'a self, tile: &Tile) -> impl Iterator<Item = &'a TerrainEntry> + 'a {
        let void = self.translate_tile(TileKind::Void);
        let foreground = (tile.foreground != void).then_some(tile.foreground);
        [Some(tile.background), foreground].into_iter().flatten().filter_map(|id| self.entry(id))
    }
}

/// Creature traits that bend the default cost table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Walker {
    pub swims: bool,
    pub flies: bool,
}

impl TerrainRules for TerrainTable {
    type Creature = Walker;

    fn translate_tile(&self, kind: TileKind) -> TileId {
        self.entries
            .iter()
            .position(|entry| entry.kind == kind)
            .map_or(TileId(0), |index| TileId(index as u16))
    }

    fn is_barrier(&self, tile: &Tile) -> bool {
        self.layers(tile).any(|entry| entry.barrier)
    }

    fn blocks_los(&self, tile: &Tile) -> bool {
        self.layers(tile).any(|entry| entry.blocks_los)
    }

    fn path_tile_cost(&self, creature: &Walker, _pos: Pos, tile: &Tile) -> f32 {
        self.layers(tile).map(|entry| entry_cost(entry, creature)).fold(0.0, f32::max)
    }

    fn min_step_cost(&self, creature: &Walker) -> f32 {
        self.entries
            .iter()
            .map(|entry| entry_cost(entry, creature))
            .filter(|&cost| cost < BARRIER_COST)
            .reduce(f32::min)
            .map_or(0.0, |cost| cost.max(0.0))
    }
}

fn entry_cost(entry: &TerrainEntry, creature: &Walker) -> f32 {
    if entry.liquid && (creature.swims || creature.flies) {
        1.0
    } else if entry.barrier {
        BARRIER_COST
    } else {
        entry.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_of(table: &TerrainTable, background: TileKind, foreground: TileKind) -> Tile {
        Tile::new(table.translate_tile(background), table.translate_tile(foreground))
    }

    #[test]
    fn every_kind_translates_to_its_own_entry() {
        let table = TerrainTable::default();
        for (index, entry) in table.entries.iter().enumerate() {
            assert_eq!(table.translate_tile(entry.kind), TileId(index as u16));
        }
    }

    #[test]
    fn higher_foreground_cost_dominates_background() {
        let table = TerrainTable::default();
        let walker = Walker::default();
        let road = tile_of(&table, TileKind::Road, TileKind::Void);
        let road_with_tree = tile_of(&table, TileKind::Road, TileKind::Tree);
        let tree_on_floor = tile_of(&table, TileKind::Tree, TileKind::Floor);

        assert_eq!(table.path_tile_cost(&walker, Pos::default(), &road), 0.8);
        assert_eq!(table.path_tile_cost(&walker, Pos::default(), &road_with_tree), 3.0);
        assert_eq!(table.path_tile_cost(&walker, Pos::default(), &tree_on_floor), 3.0);
    }

    #[test]
    fn water_is_a_barrier_unless_the_creature_swims() {
        let table = TerrainTable::default();
        let water = tile_of(&table, TileKind::Water, TileKind::Void);
        assert!(table.is_barrier(&water));
        assert!(!table.blocks_los(&water));
        assert_eq!(table.path_tile_cost(&Walker::default(), Pos::default(), &water), BARRIER_COST);
        let swimmer = Walker { swims: true, flies: false };
        assert_eq!(table.path_tile_cost(&swimmer, Pos::default(), &water), 1.0);
    }

    #[test]
    fn out_of_grid_cells_block_everything() {
        let table = TerrainTable::default();
        let grid = Grid::new(3, 3, tile_of(&table, TileKind::Floor, TileKind::Void));
        assert!(!is_barrier(&grid, &table, Pos::new(1, 1)));
        assert!(is_barrier(&grid, &table, Pos::new(-1, 1)));
        assert!(is_block_los(&grid, &table, Pos::new(3, 0)));
    }

    #[test]
    fn void_and_mark_overlays_are_not_terrain_to_cross() {
        let table = TerrainTable::default();
        let void = tile_of(&table, TileKind::Void, TileKind::Void);
        assert!(table.is_barrier(&void));
        assert!(table.blocks_los(&void));
        let marked = tile_of(&table, TileKind::MarkExhausted, TileKind::Void);
        assert!(table.is_barrier(&marked));
        let floor_under_void = tile_of(&table, TileKind::Floor, TileKind::Void);
        assert!(!table.is_barrier(&floor_under_void));
    }

    #[test]
    fn cheapest_step_is_the_road() {
        let table = TerrainTable::default();
        assert_eq!(table.min_step_cost(&Walker::default()), 0.8);
        let swimmer = Walker { swims: true, flies: false };
        assert_eq!(table.min_step_cost(&swimmer), 0.8);

        let mut pricey = TerrainTable::default();
        for entry in &mut pricey.entries {
            entry.cost = entry.cost.max(2.0);
        }
        assert_eq!(pricey.min_step_cost(&Walker::default()), 2.0);
    }

    #[test]
    fn table_survives_json() {
        let table = TerrainTable::default();
        let json = serde_json::to_string(&table).expect("serialize");
        let decoded: TerrainTable = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(table, decoded);
    }
}
