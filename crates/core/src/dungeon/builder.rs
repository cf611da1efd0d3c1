//! Depth-first placement of areas from marks until the dungeon is dense enough.

use slotmap::SlotMap;
use tracing::{debug, info, warn};

use crate::dice::Dice;
use crate::grid::{Grid, Tile};
use crate::terrain::{TerrainRules, TileKind};
use crate::types::{AreaId, Direction, Pos, Rect};

use super::area::{AreaKind, DungeonArea, MarkRef, build_area, generate_marks};
use super::config::BuilderConfig;
use super::error::{AreaError, BuildError};
use super::index::AreaIndex;
use super::mark::{Mark, MarkState};
use super::shape::{Shape, intersects};

#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport {
    pub areas: usize,
    pub devoured: u64,
    pub coverage_percent: f64,
    /// Passes run, including the successful one.
    pub attempts: u32,
    /// Placement attempts spent in the successful pass.
    pub steps: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MarkSlot {
    Root,
    Owned(MarkRef),
}

pub struct DungeonBuilder {
    config: BuilderConfig,
    rect: Rect,
    dice: Dice,
    areas: SlotMap<AreaId, DungeonArea>,
    index: AreaIndex,
    root: Mark,
    devoured: u64,
    steps: u64,
}

impl DungeonBuilder {
    pub fn new(config: BuilderConfig, rect: Rect) -> Self {
        let dice = Dice::new(config.seed);
        let root = Mark::new(rect.center(), Direction::North, config.mark_retries);
        Self {
            config,
            rect,
            dice,
            areas: SlotMap::with_key(),
            index: AreaIndex::default(),
            root,
            devoured: 0,
            steps: 0,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn areas(&self) -> impl Iterator<Item = &DungeonArea> {
        self.areas.values()
    }

    pub fn area(&self, id: AreaId) -> Option<&DungeonArea> {
        self.areas.get(id)
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn root_mark(&self) -> &Mark {
        &self.root
    }

    pub fn mark(&self, mark: MarkRef) -> Option<&Mark> {
        self.areas.get(mark.area)?.marks.get(mark.index)
    }

    pub fn devoured_area(&self) -> u64 {
        self.devoured
    }

    pub fn coverage_percent(&self) -> f64 {
        let square = self.rect.square();
        if square == 0 {
            return 0.0;
        }
        self.devoured as f64 / square as f64 * 100.0
    }

    /// Fills `self.rect` of `grid` with areas grown from `start` (default:
    /// the rect centre).
    ///
    /// Configuration and geometry are validated before the grid is touched.
    /// Each pass starts from scratch; a pass that ends below the coverage
    /// target is wiped and retried with the dice stream continuing.
    pub fn build<R: TerrainRules>(
        &mut self,
        grid: &mut Grid,
        rules: &R,
        start: Option<Pos>,
    ) -> Result<BuildReport, BuildError> {
        self.config.validate()?;
        if self.rect.is_empty() {
            return Err(BuildError::EmptyRect);
        }
        if !grid.bounds().contains_rect(self.rect) {
            return Err(BuildError::RectOutsideGrid {
                rect: self.rect,
                width: grid.width(),
                height: grid.height(),
            });
        }
        let start = start.unwrap_or(self.rect.center());
        if !self.rect.contains(start) {
            return Err(BuildError::StartOutsideRect { start });
        }

        let target = self.config.devoured_area_bottom_limit;
        info!(
            seed = self.config.seed,
            rect = ?self.rect,
            ?start,
            target,
            weights = ?self.config.weights,
            "building dungeon"
        );

        let mut best_percent: f64 = 0.0;
        for attempt in 1..=self.config.max_restarts {
            self.reset(grid, rules);
            let heading = Direction::CARDINALS[self.dice.below(4)];
            self.root = Mark::new(start, heading, self.config.mark_retries);
            self.root.forced_area = Some(self.config.startup_area);

            self.run_pass(grid, rules)?;
            if self.config.debug_marks {
                for area in self.areas.values() {
                    area.flush_marks(grid, rules);
                }
            }

            let coverage = self.coverage_percent();
            best_percent = best_percent.max(coverage);
            if coverage >= f64::from(target) {
                info!(attempt, areas = self.areas.len(), coverage, "dungeon built");
                return Ok(BuildReport {
                    areas: self.areas.len(),
                    devoured: self.devoured,
                    coverage_percent: coverage,
                    attempts: attempt,
                    steps: self.steps,
                });
            }
            debug!(attempt, areas = self.areas.len(), coverage, "coverage below target");
        }

        Err(BuildError::CoverageNotReached {
            attempts: self.config.max_restarts,
            target,
            best_percent,
        })
    }

    fn reset<R: TerrainRules>(&mut self, grid: &mut Grid, rules: &R) {
        self.areas.clear();
        self.index.clear();
        self.devoured = 0;
        self.steps = 0;
        let rock = rules.translate_tile(TileKind::Rock);
        grid.fill_rect(self.rect, &Tile::new(rock, rules.translate_tile(TileKind::Void)));
    }

    /// One depth-first sweep: every mark is processed once, children before
    /// later siblings, until no open mark is left or the step budget runs out.
    fn run_pass<R: TerrainRules>(&mut self, grid: &mut Grid, rules: &R) -> Result<(), BuildError> {
        let mut stack = vec![MarkSlot::Root];
        while let Some(slot) = stack.pop() {
            if self.steps >= self.config.max_steps {
                warn!(steps = self.steps, pending = stack.len() + 1, "step budget spent");
                break;
            }
            match self.process_mark(slot, grid, rules) {
                Ok(Some(id)) => {
                    let count = self.areas.get(id).map_or(0, |area| area.marks.len());
                    let children = (0..count).rev().map(|index| MarkRef { area: id, index });
                    stack.extend(children.map(MarkSlot::Owned));
                }
                Ok(None) => {}
                Err(err) => match slot {
                    MarkSlot::Root => return Err(err.into()),
                    MarkSlot::Owned(mark) => warn!(?mark, %err, "skipping mark"),
                },
            }
        }
        Ok(())
    }

    /// Tries to grow an area from one mark, returning the accepted area.
    fn process_mark<R: TerrainRules>(
        &mut self,
        slot: MarkSlot,
        grid: &mut Grid,
        rules: &R,
    ) -> Result<Option<AreaId>, AreaError> {
        let mut mark = self.mark_mut(slot)?.clone();
        if !mark.is_open() {
            return Ok(None);
        }
        let owner = match slot {
            MarkSlot::Root => None,
            MarkSlot::Owned(mark) => Some(mark.area),
        };
        if self.points_to_other_area(&mark, owner) {
            mark.settle(MarkState::PointsToOtherArea);
            *self.mark_mut(slot)? = mark;
            return Ok(None);
        }

        let mut accepted = None;
        while mark.is_open() && self.steps < self.config.max_steps {
            self.steps += 1;
            let kind = match mark.forced_area {
                Some(kind) => kind,
                None => match self.config.weights.pick(self.dice.roll_percent()) {
                    Some(kind) => kind,
                    None => {
                        mark.exhaust();
                        break;
                    }
                },
            };
            match self.try_place(kind, &mark) {
                Some(shape) => {
                    accepted = Some((kind, shape));
                    mark.settle(MarkState::AreaGenerator);
                }
                None => {
                    debug!(?kind, pos = ?mark.pos, dir = ?mark.dir, "candidate rejected");
                    mark.fail_attempt();
                }
            }
        }
        *self.mark_mut(slot)? = mark.clone();

        let Some((kind, shape)) = accepted else {
            return Ok(None);
        };
        let parent = match slot {
            MarkSlot::Root => None,
            MarkSlot::Owned(mark) => Some(mark),
        };
        let mut area = DungeonArea::new(kind, shape, parent, &mark);
        area.marks = generate_marks(&area, &self.config, &mut self.dice);
        let id = self.areas.insert(area);
        self.areas[id].id = id;
        self.index.insert(id, shape.bounds());
        self.devoured += self.areas[id].devoured;
        self.areas[id].flush_to_map(grid, rules);
        debug!(?id, ?kind, parent = ?parent, marks = self.areas[id].marks.len(), "area accepted");
        Ok(Some(id))
    }

    /// Candidate of `kind` for `mark` that fits the rect and overlaps nothing.
    fn try_place(&mut self, kind: AreaKind, mark: &Mark) -> Option<Shape> {
        let shape = build_area(kind, mark, &self.config, &mut self.dice)?;
        if !self.rect.contains_rect(shape.bounds()) {
            return None;
        }
        let blocked = self.index.candidates(shape.bounds()).any(|id| {
            self.areas.get(id).is_some_and(|other| intersects(&other.shape, &shape))
        });
        (!blocked).then_some(shape)
    }

    /// The cell beyond the mark already belongs to an accepted area other than its owner.
    fn points_to_other_area(&self, mark: &Mark, owner: Option<AreaId>) -> bool {
        let target = mark.target();
        self.index.at(target).iter().any(|&id| {
            Some(id) != owner && self.areas.get(id).is_some_and(|area| area.shape.contains(target))
        })
    }

    fn mark_mut(&mut self, slot: MarkSlot) -> Result<&mut Mark, AreaError> {
        match slot {
            MarkSlot::Root => Ok(&mut self.root),
            MarkSlot::Owned(mark) => self
                .areas
                .get_mut(mark.area)
                .ok_or(AreaError::MissingArea(mark.area))?
                .marks
                .get_mut(mark.index)
                .ok_or(AreaError::MissingMark(mark)),
        }
    }
}
