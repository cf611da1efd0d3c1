use anyhow::{Result, bail};
use cellar::dungeon::intersects;
use cellar::{
    BuildError, BuilderConfig, Dice, Direction, DungeonBuilder, Grid, PathSearch, Pos, Rect,
    TerrainRules, TerrainTable, Tile, TileKind, Walker, fov,
};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of consecutive seeds to try
    #[arg(short, long, default_value_t = 100)]
    runs: u64,
    #[arg(long, default_value_t = 100)]
    width: usize,
    #[arg(long, default_value_t = 70)]
    height: usize,
    #[arg(long)]
    cellar: bool,
}

fn check_dungeon(builder: &DungeonBuilder) -> Result<(), String> {
    let areas: Vec<_> = builder.areas().collect();
    for (i, a) in areas.iter().enumerate() {
        if !builder.rect().contains_rect(a.shape.bounds()) {
            return Err(format!("area {:?} leaves the dungeon rect", a.id));
        }
        if let Some(b) = areas[i + 1..].iter().find(|b| intersects(&a.shape, &b.shape)) {
            return Err(format!("areas {:?} and {:?} overlap", a.id, b.id));
        }
        if a.marks.iter().any(|mark| mark.is_open()) {
            return Err(format!("area {:?} has an unprocessed mark", a.id));
        }
    }
    Ok(())
}

/// Routes between random floor cells must only cross passable tiles.
fn check_routes(grid: &mut Grid, table: &TerrainTable, dice: &mut Dice) -> Result<(), String> {
    let floor = table.translate_tile(TileKind::Floor);
    let floors: Vec<Pos> = grid
        .positions()
        .filter(|&pos| grid.get_tile(pos).is_some_and(|tile| tile.background == floor))
        .collect();
    let search = PathSearch::default();
    let walker = Walker::default();
    for _ in 0..8 {
        let (Some(&src), Some(&dst)) = (dice.pick(&floors), dice.pick(&floors)) else {
            return Ok(());
        };
        search.clear(grid);
        let found = search
            .search(grid, table, src, dst, &walker, true)
            .map_err(|err| format!("search {src:?} -> {dst:?}: {err}"))?;
        let Some(route) = found else {
            continue;
        };
        for pos in route.path.unwrap_or_default() {
            let blocked = grid.get_tile(pos).is_none_or(|tile| table.is_barrier(tile));
            if blocked {
                return Err(format!("route {src:?} -> {dst:?} crosses a barrier at {pos:?}"));
            }
        }

        let viewport = grid.bounds();
        fov::reset(grid, viewport);
        fov::fov_start(grid, table, src, 8, Direction::None, viewport);
        if !grid.is_seen(src) {
            return Err(format!("viewer at {src:?} cannot see itself"));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let table = TerrainTable::default();
    let void = table.translate_tile(TileKind::Void);
    let rect = Rect::new(0, 0, args.width as i32, args.height as i32);

    println!(
        "Fuzzing {} seeds from {} on a {}x{} map...",
        args.runs, args.seed, args.width, args.height
    );
    let mut failures = 0;
    let mut shortfalls = 0;
    for seed in args.seed..args.seed + args.runs {
        let base = if args.cellar { BuilderConfig::cellar() } else { BuilderConfig::default() };
        let config = base.with_seed(seed);
        let mut grid = Grid::new(args.width, args.height, Tile::new(void, void));
        let mut builder = DungeonBuilder::new(config, rect);

        match builder.build(&mut grid, &table, None) {
            Ok(_) => {}
            Err(BuildError::CoverageNotReached { best_percent, .. }) => {
                println!("seed {seed}: coverage stalled at {best_percent:.1}%");
                shortfalls += 1;
                continue;
            }
            Err(err) => bail!("seed {seed}: {err}"),
        }

        let mut dice = Dice::new(seed);
        let checks = check_dungeon(&builder)
            .and_then(|()| check_routes(&mut grid, &table, &mut dice));
        if let Err(reason) = checks {
            println!("seed {seed}: invariant failed: {reason}");
            failures += 1;
        }
    }

    println!("{failures} invariant failures, {shortfalls} coverage shortfalls");
    if failures > 0 {
        bail!("{failures} seeds broke an invariant");
    }
    Ok(())
}
