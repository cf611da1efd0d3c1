use cellar::fov::{LOS_DELTA, fov_start, remember, reset};
use cellar::{Direction, Grid, Pos, Rect, TerrainRules, TerrainTable, Tile, TileKind};
use proptest::prelude::*;

const SIDE: usize = 31;

fn room_with_pillars(pillars: &[(i32, i32)]) -> (Grid, TerrainTable) {
    let table = TerrainTable::default();
    let void = table.translate_tile(TileKind::Void);
    let floor = table.translate_tile(TileKind::Floor);
    let wall = table.translate_tile(TileKind::Wall);
    let mut grid = Grid::new(SIDE, SIDE, Tile::new(floor, void));
    for &(x, y) in pillars {
        grid.set_background(Pos::new(x, y), wall);
    }
    (grid, table)
}

fn heading() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::None), (0usize..8).prop_map(Direction::from_index)]
}

#[test]
fn fog_of_war_accumulates_across_moves() {
    let (mut grid, table) = room_with_pillars(&[]);
    let viewport = grid.bounds();
    let mut origin = Pos::new(5, 15);
    for _ in 0..20 {
        reset(&mut grid, viewport);
        fov_start(&mut grid, &table, origin, 4, Direction::East, viewport);
        remember(&mut grid, viewport);
        origin = origin.step(Direction::East);
    }
    assert!(grid.is_visited(Pos::new(5, 15)));
    assert!(grid.is_visited(Pos::new(24, 15)));
    assert!(!grid.is_seen(Pos::new(5, 15)));
    assert!(!grid.is_visited(Pos::new(15, 2)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sight_never_exceeds_the_radius(
        pillars in prop::collection::vec((0..SIDE as i32, 0..SIDE as i32), 0..60),
        origin in (0..SIDE as i32, 0..SIDE as i32),
        radius in 0i32..14,
        last_move in heading(),
    ) {
        let (mut grid, table) = room_with_pillars(&pillars);
        let origin = Pos::new(origin.0, origin.1);
        let viewport = grid.bounds();
        fov_start(&mut grid, &table, origin, radius, last_move, viewport);

        prop_assert!(grid.is_seen(origin));
        let reach = radius as f32 + LOS_DELTA;
        for pos in grid.positions().filter(|&pos| grid.is_seen(pos)) {
            prop_assert!(pos.distance_squared(origin) as f32 <= reach * reach, "{pos:?}");
        }
    }

    #[test]
    fn viewport_bounds_every_seen_cell(
        origin in (5..25i32, 5..25i32),
        left in 0i32..15,
        top in 0i32..15,
    ) {
        let (mut grid, table) = room_with_pillars(&[]);
        let viewport = Rect::new(left, top, 12, 12);
        let origin = Pos::new(origin.0, origin.1);
        fov_start(&mut grid, &table, origin, 10, Direction::None, viewport);
        for pos in grid.positions().filter(|&pos| grid.is_seen(pos)) {
            prop_assert!(viewport.contains(pos), "{pos:?}");
        }
    }
}
