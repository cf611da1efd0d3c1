mod config;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cellar::landscape::{carve_river, draw_border, grow_lake};
use cellar::{
    BuilderConfig, Dice, Direction, DungeonBuilder, Grid, PathSearch, Pos, TerrainRules,
    TerrainTable, Tile, TileKind, Walker, fov,
};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_builder_config;
use crate::render::{Overlay, render};

#[derive(Parser)]
#[command(author, version, about = "Generate a map and dump it as ASCII", long_about = None)]
struct Args {
    /// TOML file with builder settings; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Use the dense cellar preset instead of the default weights
    #[arg(long, conflicts_with = "config")]
    cellar: bool,
    /// Overrides the seed from the config
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 80)]
    width: usize,
    #[arg(long, default_value_t = 50)]
    height: usize,
    /// Start cell as `x,y`; defaults to the map centre
    #[arg(long, value_parser = parse_cell)]
    start: Option<Pos>,
    /// Draw an outdoor map with a lake and a river instead of a dungeon
    #[arg(long)]
    outdoor: bool,
    /// Find a route from the start cell to `x,y` and draw it
    #[arg(long, value_parser = parse_cell)]
    route: Option<Pos>,
    /// Show only what is visible from the start cell within this radius
    #[arg(long)]
    sight: Option<i32>,
    /// Print the summary without the map
    #[arg(short, long)]
    quiet: bool,
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_cell(text: &str) -> Result<Pos, String> {
    let (x, y) = text.split_once(',').ok_or_else(|| format!("expected x,y but got {text:?}"))?;
    let parse = |part: &str| {
        part.trim().parse::<i32>().map_err(|err| format!("{part:?}: {err}"))
    };
    Ok(Pos::new(parse(x)?, parse(y)?))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// Meadow framed by a border, with a road, a lake and a river crossing it.
fn draw_outdoor(grid: &mut Grid, table: &TerrainTable, seed: u64) {
    let mut dice = Dice::new(seed);
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let ground = table.translate_tile(TileKind::Ground);
    let grass = table.translate_tile(TileKind::Grass);
    let tree = table.translate_tile(TileKind::Tree);
    let road = table.translate_tile(TileKind::Road);

    for pos in grid.positions() {
        grid.set_background(pos, if dice.chance(30) { grass } else { ground });
        if dice.chance(6) {
            grid.set_foreground(pos, tree);
        }
    }
    let road_x = dice.range(width / 4, width * 3 / 4);
    for y in 0..height {
        grid.set_background(Pos::new(road_x, y), road);
    }
    let bounds = grid.bounds();
    draw_border(grid, table, bounds, 1);

    let centre = Pos::new(dice.range(2, width - 3), dice.range(2, height - 3));
    let size = (width * height / 12).max(1) as usize;
    let cells = grow_lake(grid, table, &mut dice, centre, size);
    let from = Pos::new(1, dice.range(1, height - 2));
    let to = Pos::new(width - 2, dice.range(1, height - 2));
    let course = carve_river(grid, table, &mut dice, from, to, 2);
    info!(lake = cells, river = course.len(), road_x, "outdoor map drawn");
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => load_builder_config(path)?,
        None if args.cellar => BuilderConfig::cellar(),
        None => BuilderConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let table = TerrainTable::default();
    let void = table.translate_tile(TileKind::Void);
    let mut grid = Grid::new(args.width, args.height, Tile::new(void, void));
    let bounds = grid.bounds();
    let start = args.start.unwrap_or(bounds.center());

    if args.outdoor {
        draw_outdoor(&mut grid, &table, config.seed);
    } else {
        let mut builder = DungeonBuilder::new(config, bounds);
        let report = builder
            .build(&mut grid, &table, Some(start))
            .context("dungeon generation failed")?;
        println!(
            "areas: {}  coverage: {:.1}%  attempts: {}  steps: {}",
            report.areas, report.coverage_percent, report.attempts, report.steps
        );
    }

    let mut overlay = Overlay { origin: Some(start), ..Overlay::default() };
    if let Some(target) = args.route {
        let found = PathSearch::default()
            .search(&mut grid, &table, start, target, &Walker::default(), true)
            .context("route probe failed")?;
        match found {
            Some(route) => {
                println!("route: {} steps, cost {:.2}", route.distance, route.cost);
                overlay.route.extend(route.path.unwrap_or_default());
            }
            None => println!("route: {target:?} is unreachable from {start:?}"),
        }
    }
    if let Some(radius) = args.sight {
        fov::fov_start(&mut grid, &table, start, radius, Direction::None, bounds);
        overlay.fog = true;
    }

    if !args.quiet {
        print!("{}", render(&grid, &table, &overlay));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_with_optional_spaces() {
        assert_eq!(parse_cell("3,4"), Ok(Pos::new(3, 4)));
        assert_eq!(parse_cell(" 10 , -2"), Ok(Pos::new(10, -2)));
        assert!(parse_cell("3;4").is_err());
        assert!(parse_cell("a,4").is_err());
    }

    #[test]
    fn cellar_preset_conflicts_with_a_config_file() {
        let parsed = Args::try_parse_from(["cellar", "--cellar", "--config", "x.toml"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn outdoor_map_has_every_feature() {
        let table = TerrainTable::default();
        let void = table.translate_tile(TileKind::Void);
        let mut grid = Grid::new(60, 40, Tile::new(void, void));
        draw_outdoor(&mut grid, &table, 3);

        let kinds: Vec<_> = grid
            .positions()
            .filter_map(|pos| grid.get_tile(pos))
            .filter_map(|tile| table.kind_of(tile.background))
            .collect();
        for wanted in [TileKind::Border, TileKind::Road, TileKind::Water, TileKind::Sand] {
            assert!(kinds.contains(&wanted), "{wanted:?} missing");
        }
    }
}
