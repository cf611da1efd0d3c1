//! Candidate doorways from which new areas are grown.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Pos};

use super::area::AreaKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkState {
    #[default]
    Undefined,
    /// An area was grown from this mark; its cell is now a door.
    AreaGenerator,
    RetriesExhausted,
    /// The cell beyond the mark already belongs to an accepted area.
    PointsToOtherArea,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    pub pos: Pos,
    pub dir: Direction,
    pub forced_area: Option<AreaKind>,
    state: MarkState,
    retries_left: u32,
}

impl Mark {
    pub fn new(pos: Pos, dir: Direction, retries: u32) -> Self {
        Self { pos, dir, forced_area: None, state: MarkState::Undefined, retries_left: retries }
    }

    /// A stored `RetriesExhausted` only becomes final once the budget is spent.
    pub fn state(&self) -> MarkState {
        match self.state {
            MarkState::RetriesExhausted if self.retries_left > 0 => MarkState::Undefined,
            state => state,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == MarkState::Undefined
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }

    /// First cell of whatever area grows from this mark.
    pub fn target(&self) -> Pos {
        self.pos.step(self.dir)
    }

    pub(crate) fn fail_attempt(&mut self) {
        self.retries_left = self.retries_left.saturating_sub(1);
        self.state = MarkState::RetriesExhausted;
    }

    pub(crate) fn exhaust(&mut self) {
        self.retries_left = 0;
        self.state = MarkState::RetriesExhausted;
    }

    pub(crate) fn settle(&mut self, state: MarkState) {
        self.state = state;
    }
}
