//! Tile storage shared by generation, field of view and pathfinding.
//!
//! Besides terrain, each tile carries transient algorithm state: the `SEEN`
//! flag written by FOV and the `pf_*` fields written by A*. Neither algorithm
//! resets that state implicitly; callers run [`Grid::reset_seen`] and
//! [`Grid::clear_path_state`] between runs.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::terrain::TileId;
use crate::types::{Direction, Pos, Rect};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TileFlags: u8 {
        /// Inside the viewer's field of view on the last FOV pass.
        const SEEN = 1;
        /// Seen at some point; the fog-of-war memory layer.
        const VISITED = 1 << 1;
        /// Reserved by generation; nothing may be placed here.
        const NOT_FREE = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathStatus {
    #[default]
    Unvisited,
    Open,
    Closed,
    Barrier,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub background: TileId,
    pub foreground: TileId,
    pub extensions: [TileId; 2],
    pub flags: TileFlags,
    pub pf_status: PathStatus,
    pub pf_prev: Option<Pos>,
    pub pf_cost: f32,
}

impl Tile {
    pub fn new(background: TileId, foreground: TileId) -> Self {
        Self {
            background,
            foreground,
            extensions: [TileId::default(); 2],
            flags: TileFlags::empty(),
            pf_status: PathStatus::Unvisited,
            pf_prev: None,
            pf_cost: 0.0,
        }
    }

    fn clear_path_state(&mut self) {
        self.pf_status = PathStatus::Unvisited;
        self.pf_prev = None;
        self.pf_cost = 0.0;
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    path_state_dirty: bool,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self { width, height, tiles: vec![fill; width * height], path_state_dirty: false }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn get_tile(&self, pos: Pos) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles.get(self.index(pos))
    }

    pub fn get_tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        self.tiles.get_mut(idx)
    }

    pub fn set_background(&mut self, pos: Pos, id: TileId) {
        if let Some(tile) = self.get_tile_mut(pos) {
            tile.background = id;
        }
    }

    pub fn set_foreground(&mut self, pos: Pos, id: TileId) {
        if let Some(tile) = self.get_tile_mut(pos) {
            tile.foreground = id;
        }
    }

    /// Resets every in-bounds tile of `rect` to `fill`.
    pub fn fill_rect(&mut self, rect: Rect, fill: &Tile) {
        let Some(clipped) = rect.intersection(self.bounds()) else {
            return;
        };
        for pos in clipped.positions() {
            let idx = self.index(pos);
            self.tiles[idx] = fill.clone();
        }
    }

    pub fn neighbours4(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        Direction::CARDINALS
            .into_iter()
            .map(move |dir| pos.step(dir))
            .filter(|&next| self.in_bounds(next))
    }

    /// In-bounds neighbours in compass order (N, NE, E, ... NW).
    pub fn neighbours8(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        Direction::COMPASS.into_iter().map(move |dir| pos.step(dir)).filter(|&p| self.in_bounds(p))
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        self.bounds().positions()
    }

    pub fn clear_path_state(&mut self) {
        for tile in &mut self.tiles {
            tile.clear_path_state();
        }
        self.path_state_dirty = false;
    }

    pub(crate) fn path_state_dirty(&self) -> bool {
        self.path_state_dirty
    }

    pub(crate) fn mark_path_state_dirty(&mut self) {
        self.path_state_dirty = true;
    }

    pub fn is_seen(&self, pos: Pos) -> bool {
        self.get_tile(pos).is_some_and(|tile| tile.flags.contains(TileFlags::SEEN))
    }

    pub fn is_visited(&self, pos: Pos) -> bool {
        self.get_tile(pos).is_some_and(|tile| tile.flags.contains(TileFlags::VISITED))
    }

    pub fn reset_seen(&mut self, viewport: Rect) {
        let Some(clipped) = viewport.intersection(self.bounds()) else {
            return;
        };
        for pos in clipped.positions() {
            let idx = self.index(pos);
            self.tiles[idx].flags.remove(TileFlags::SEEN);
        }
    }

    pub fn remember_seen(&mut self, viewport: Rect) {
        let Some(clipped) = viewport.intersection(self.bounds()) else {
            return;
        };
        for pos in clipped.positions() {
            let idx = self.index(pos);
            let tile = &mut self.tiles[idx];
            if tile.flags.contains(TileFlags::SEEN) {
                tile.flags.insert(TileFlags::VISITED);
            }
        }
    }

    /// Hash of terrain layers only; transient state does not contribute.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&(self.width as u32).to_le_bytes());
        hasher.update(&(self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            hasher.update(&tile.background.0.to_le_bytes());
            hasher.update(&tile.foreground.0.to_le_bytes());
            hasher.update(&tile.extensions[0].0.to_le_bytes());
            hasher.update(&tile.extensions[1].0.to_le_bytes());
        }
        hasher.digest()
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}
