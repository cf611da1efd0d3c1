//! ASCII dump of a grid.

use std::collections::HashSet;

use cellar::{Grid, Pos, TerrainTable};

/// What to draw on top of the terrain glyphs.
#[derive(Default)]
pub struct Overlay {
    pub route: HashSet<Pos>,
    pub origin: Option<Pos>,
    /// Blank out cells that were never seen.
    pub fog: bool,
}

pub fn render(grid: &Grid, table: &TerrainTable, overlay: &Overlay) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let pos = Pos::new(x, y);
            let glyph = if overlay.origin == Some(pos) {
                '@'
            } else if overlay.route.contains(&pos) {
                '*'
            } else if overlay.fog && !grid.is_seen(pos) && !grid.is_visited(pos) {
                ' '
            } else {
                grid.get_tile(pos).map_or(' ', |tile| table.glyph(tile))
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellar::{TerrainRules, Tile, TileKind};

    #[test]
    fn overlay_wins_over_terrain() {
        let table = TerrainTable::default();
        let floor = table.translate_tile(TileKind::Floor);
        let void = table.translate_tile(TileKind::Void);
        let mut grid = Grid::new(3, 2, Tile::new(floor, void));
        grid.set_background(Pos::new(2, 1), table.translate_tile(TileKind::Wall));

        let overlay = Overlay {
            route: HashSet::from([Pos::new(1, 0)]),
            origin: Some(Pos::new(0, 0)),
            fog: false,
        };
        assert_eq!(render(&grid, &table, &overlay), "@*.\n..#\n");
    }

    #[test]
    fn fog_hides_unseen_cells() {
        let table = TerrainTable::default();
        let floor = table.translate_tile(TileKind::Floor);
        let void = table.translate_tile(TileKind::Void);
        let grid = Grid::new(2, 1, Tile::new(floor, void));
        let overlay = Overlay { fog: true, ..Overlay::default() };
        assert_eq!(render(&grid, &table, &overlay), "  \n");
    }
}
